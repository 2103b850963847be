//! Typed transactions
//!
//! Binds a transaction id to serde request/response types and encodes
//! them with postcard, so both halves share one definition of the payload
//! shape instead of hand-packed byte offsets.

use core::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use splitsync_hal::{Link, TickSource};
use splitsync_protocol::{Payload, TransactionId, MAX_PAYLOAD_SIZE};

use crate::executor::{Initiator, TransactionError};
use crate::registry::Handler;

/// A request/response contract
pub trait Transaction {
    /// Wire id
    const ID: TransactionId;
    /// Sent by the master
    type Request: Serialize + DeserializeOwned;
    /// Returned by the slave
    type Response: Serialize + DeserializeOwned;
}

/// Handler adaptor decoding the request and encoding the response
pub struct Typed<T, F> {
    handler: F,
    _transaction: PhantomData<fn() -> T>,
}

impl<T, F> Typed<T, F>
where
    T: Transaction,
    F: Fn(T::Request) -> T::Response,
{
    /// Wrap a typed handler function
    pub const fn new(handler: F) -> Self {
        Self {
            handler,
            _transaction: PhantomData,
        }
    }
}

impl<T, F> Handler for Typed<T, F>
where
    T: Transaction,
    F: Fn(T::Request) -> T::Response,
{
    fn handle(&self, request: &[u8], response: &mut Payload) {
        let Ok(request) = postcard::from_bytes::<T::Request>(request) else {
            warn!("undecodable request for transaction {}", T::ID);
            return;
        };

        let reply = (self.handler)(request);
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        match postcard::to_slice(&reply, &mut buf) {
            Ok(bytes) => {
                // Both sides are bounded by MAX_PAYLOAD_SIZE
                let _ = response.extend_from_slice(bytes);
            }
            Err(_) => {
                warn!("response for transaction {} does not fit a frame", T::ID);
            }
        }
    }
}

/// Run a typed transaction from the master
pub fn send_typed<T, L, S>(
    initiator: &mut Initiator<L, S>,
    request: &T::Request,
) -> Result<T::Response, TransactionError>
where
    T: Transaction,
    L: Link,
    S: TickSource,
{
    let mut request_buf = [0u8; MAX_PAYLOAD_SIZE];
    let encoded =
        postcard::to_slice(request, &mut request_buf).map_err(|_| TransactionError::Encode)?;

    let mut response_buf = [0u8; MAX_PAYLOAD_SIZE];
    let len = initiator.send(T::ID, encoded, &mut response_buf)?;

    postcard::from_bytes(&response_buf[..len]).map_err(|_| TransactionError::Decode)
}
