//! Initiator shared between async tasks
//!
//! The link is a single half-duplex resource. Wrapping the initiator in an
//! async mutex makes a second caller wait until the first transaction has
//! resolved, so frames of different transactions never interleave.

use core::task::Poll;

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use splitsync_hal::{Link, TickSource};
use splitsync_protocol::{TransactionId, MAX_PAYLOAD_SIZE};

use super::{Initiator, TransactionError};

/// Mutex-guarded [`Initiator`]
pub struct SharedInitiator<M: RawMutex, L, S> {
    inner: Mutex<M, Initiator<L, S>>,
}

impl<M: RawMutex, L: Link, S: TickSource> SharedInitiator<M, L, S> {
    /// Share an initiator
    pub fn new(initiator: Initiator<L, S>) -> Self {
        Self {
            inner: Mutex::new(initiator),
        }
    }

    /// Send a request and wait for its response
    ///
    /// Waits for any other caller's transaction to finish first. Yields to
    /// the executor between polls of the link.
    pub async fn send(
        &self,
        id: TransactionId,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransactionError> {
        let mut initiator = self.inner.lock().await;

        // Only possible if an earlier send future was dropped mid-flight
        if initiator.is_busy() {
            initiator.abandon();
        }

        initiator.begin(id, request)?;
        loop {
            match initiator.poll(response) {
                Poll::Ready(result) => return result,
                Poll::Pending => yield_now().await,
            }
        }
    }

    /// Send a request and wait for the acknowledgement
    pub async fn notify(&self, id: TransactionId, request: &[u8]) -> Result<(), TransactionError> {
        let mut scratch = [0u8; MAX_PAYLOAD_SIZE];
        self.send(id, request, &mut scratch).await.map(|_| ())
    }

    /// Check if the link is considered up
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected()
    }

    /// Take the initiator back
    pub fn into_inner(self) -> Initiator<L, S> {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use crate::testing::{echo, LinkEvent, PeerLink};
    use crate::timer::Timer;
    use crate::SyncConfig;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use splitsync_hal::AtomicTicks;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    const ECHO: TransactionId = TransactionId(0x10);
    const MISSING: TransactionId = TransactionId(0x11);

    #[test]
    fn test_concurrent_sends_are_serialized() {
        let clock = AtomicTicks::new();
        let registry = RegistryBuilder::new().with(ECHO, &echo).unwrap().seal();
        let events = Rc::new(RefCell::new(Vec::new()));
        let link = PeerLink::new(&registry, &clock)
            .with_delay(3)
            .with_events(events.clone());
        let initiator = Initiator::new(link, Timer::new(&clock), SyncConfig::new()).unwrap();
        let shared: SharedInitiator<NoopRawMutex, _, _> = SharedInitiator::new(initiator);

        let mut first = [0u8; 8];
        let mut second = [0u8; 8];
        let (a, b) = block_on(join(
            shared.send(ECHO, &[1, 1], &mut first),
            shared.send(ECHO, &[2, 2, 2], &mut second),
        ));

        assert_eq!(a, Ok(2));
        assert_eq!(b, Ok(3));
        assert_eq!(&first[..2], &[1, 1]);
        assert_eq!(&second[..3], &[2, 2, 2]);
        assert_eq!(
            *events.borrow(),
            [
                LinkEvent::Sent(0),
                LinkEvent::Delivered(0),
                LinkEvent::Sent(1),
                LinkEvent::Delivered(1),
            ]
        );
    }

    #[test]
    fn test_failed_send_releases_link() {
        let clock = AtomicTicks::new();
        let registry = RegistryBuilder::new().with(ECHO, &echo).unwrap().seal();
        let link = PeerLink::new(&registry, &clock);
        let config = SyncConfig::new().with_response_timeout(4);
        let initiator = Initiator::new(link, Timer::new(&clock), config).unwrap();
        let shared: SharedInitiator<NoopRawMutex, _, _> = SharedInitiator::new(initiator);

        let mut response = [0u8; 4];
        let (a, b) = block_on(join(
            shared.notify(MISSING, &[1]),
            shared.send(ECHO, &[3], &mut response),
        ));

        assert_eq!(a, Err(TransactionError::Timeout));
        assert_eq!(b, Ok(1));
        assert!(block_on(shared.is_connected()));

        let initiator = shared.into_inner();
        assert_eq!(initiator.link().sent().len(), 2);
    }
}
