//! Transaction executor
//!
//! Two roles over the same link:
//!
//! - [`Initiator`] (master): sends a request and waits, bounded by the
//!   timer, for the response carrying the same id and sequence number
//! - [`Responder`] (slave): parses inbound requests, dispatches them
//!   through the sealed [`Registry`](crate::registry::Registry) and writes
//!   the handler's output back
//!
//! Only one transaction is in flight per link. The initiator enforces this
//! through `&mut self` and its state machine; [`SharedInitiator`] adds an
//! async mutex for links shared between tasks.

mod initiator;
mod responder;
mod shared;

pub use initiator::{Initiator, State};
pub use responder::{respond, Responder};
pub use shared::SharedInitiator;

/// Bytes pulled from the link per read
pub const RX_CHUNK_SIZE: usize = 64;

/// Transaction failures reported to the caller
///
/// None of these abort the device; the caller decides whether to retry on
/// its next poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// Request exceeds the maximum payload; nothing was sent
    PayloadTooLarge,
    /// Response did not fit the caller's buffer; buffer left untouched
    ResponseTooLarge,
    /// No matching response before the deadline
    Timeout,
    /// Another transaction is still in flight
    Busy,
    /// Polled without a transaction in flight
    Idle,
    /// Link marked down; waiting for the next reconnection attempt
    Disconnected,
    /// The link refused the write
    Link,
    /// Typed request could not be serialized
    Encode,
    /// Typed response could not be deserialized
    Decode,
}
