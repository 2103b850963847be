//! Transaction handler registry
//!
//! Handlers are registered during boot through a [`RegistryBuilder`] and
//! then sealed into a [`Registry`], which has no mutating methods. The
//! responder's poll loop can therefore look handlers up without locks.
//!
//! ```text
//! RegistryBuilder ──register()*──▶ RegistryBuilder ──seal()──▶ Registry
//!   (unpopulated)                                      (read-only)
//! ```

use core::fmt;

use heapless::Vec;
use splitsync_protocol::{Payload, TransactionId};

/// Maximum handlers per registry
pub const MAX_HANDLERS: usize = 16;

/// Responder-side handler for one transaction id
///
/// Receives the request payload and a fixed-capacity response buffer.
/// Whatever is left in `response` is sent back to the master. Handlers
/// that touch shared device state must use interior mutability; they run
/// to completion before the next request on the link is read.
pub trait Handler {
    /// Serve one request
    fn handle(&self, request: &[u8], response: &mut Payload);
}

impl<F> Handler for F
where
    F: Fn(&[u8], &mut Payload),
{
    fn handle(&self, request: &[u8], response: &mut Payload) {
        self(request, response)
    }
}

/// Configuration errors raised while building a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A handler is already registered for this id
    Duplicate(TransactionId),
    /// [`MAX_HANDLERS`] handlers already registered
    Full,
}

/// One registered handler
#[derive(Clone, Copy)]
pub struct HandlerEntry<'h> {
    /// Transaction served by this handler
    pub id: TransactionId,
    handler: &'h dyn Handler,
}

impl<'h> HandlerEntry<'h> {
    /// The handler itself
    pub fn handler(&self) -> &'h dyn Handler {
        self.handler
    }
}

impl fmt::Debug for HandlerEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry").field("id", &self.id).finish()
    }
}

/// Registry under construction
#[derive(Debug, Default)]
pub struct RegistryBuilder<'h> {
    entries: Vec<HandlerEntry<'h>, MAX_HANDLERS>,
}

impl<'h> RegistryBuilder<'h> {
    /// Create an empty builder
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register `handler` for `id`
    ///
    /// A second registration for the same id is rejected; the first
    /// handler stays in place.
    pub fn register(
        &mut self,
        id: TransactionId,
        handler: &'h dyn Handler,
    ) -> Result<(), RegistryError> {
        if self.entries.iter().any(|entry| entry.id == id) {
            error!("duplicate handler for transaction {}", id);
            return Err(RegistryError::Duplicate(id));
        }

        self.entries
            .push(HandlerEntry { id, handler })
            .map_err(|_| RegistryError::Full)
    }

    /// Builder-style [`RegistryBuilder::register`]
    pub fn with(mut self, id: TransactionId, handler: &'h dyn Handler) -> Result<Self, RegistryError> {
        self.register(id, handler)?;
        Ok(self)
    }

    /// Number of handlers registered so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish registration
    pub fn seal(self) -> Registry<'h> {
        Registry {
            entries: self.entries,
        }
    }
}

/// Sealed, read-only handler table
pub struct Registry<'h> {
    entries: Vec<HandlerEntry<'h>, MAX_HANDLERS>,
}

impl<'h> Registry<'h> {
    /// Handler for `id`, if one was registered
    pub fn lookup(&self, id: TransactionId) -> Option<&'h dyn Handler> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(HandlerEntry::handler)
    }

    /// Check if `id` has a handler
    pub fn contains(&self, id: TransactionId) -> bool {
        self.lookup(id).is_some()
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = TransactionId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry has no handlers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}
