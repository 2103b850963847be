//! Raw HID report forwarding
//!
//! The host talks raw HID to the master half only. Reports that concern
//! the slave (its OLED page, counters shown there) are forwarded over the
//! link with the [`TransactionId::HID_SYNC`] transaction; the slave hands
//! them to an ingestion function supplied by the keymap.

use splitsync_hal::{Link, TickSource};
use splitsync_protocol::{Payload, TransactionId};

use crate::executor::{Initiator, SharedInitiator, TransactionError};
use crate::registry::Handler;
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Size of a raw HID report
pub const RAW_REPORT_SIZE: usize = 32;

/// Slave-side handler passing forwarded reports to `ingest`
///
/// The response is empty; it only acknowledges receipt. Requests longer
/// than [`RAW_REPORT_SIZE`] are dropped without reaching `ingest`.
pub struct HidSync<F> {
    ingest: F,
}

impl<F: Fn(&[u8])> HidSync<F> {
    /// Create a handler around an ingestion function
    pub const fn new(ingest: F) -> Self {
        Self { ingest }
    }
}

impl<F: Fn(&[u8])> Handler for HidSync<F> {
    fn handle(&self, request: &[u8], _response: &mut Payload) {
        if request.len() > RAW_REPORT_SIZE {
            warn!("dropping {} byte report, max {}", request.len(), RAW_REPORT_SIZE);
            return;
        }
        (self.ingest)(request)
    }
}

/// Forward a report to the slave and wait for the acknowledgement
///
/// Reports longer than [`RAW_REPORT_SIZE`] fail with `PayloadTooLarge`
/// before anything is sent.
pub fn forward_report<L: Link, S: TickSource>(
    initiator: &mut Initiator<L, S>,
    report: &[u8],
) -> Result<(), TransactionError> {
    check_report(report)?;
    initiator.notify(TransactionId::HID_SYNC, report)
}

/// [`forward_report`] through a shared initiator
pub async fn forward_report_shared<M: RawMutex, L: Link, S: TickSource>(
    initiator: &SharedInitiator<M, L, S>,
    report: &[u8],
) -> Result<(), TransactionError> {
    check_report(report)?;
    initiator.notify(TransactionId::HID_SYNC, report).await
}

fn check_report(report: &[u8]) -> Result<(), TransactionError> {
    if report.len() > RAW_REPORT_SIZE {
        return Err(TransactionError::PayloadTooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use crate::testing::PeerLink;
    use crate::timer::Timer;
    use crate::SyncConfig;
    use splitsync_hal::AtomicTicks;
    use std::cell::RefCell;
    use std::vec::Vec;

    #[test]
    fn test_report_reaches_ingestion() {
        let received = RefCell::new(Vec::new());
        let handler = HidSync::new(|report: &[u8]| {
            received.borrow_mut().extend_from_slice(report);
        });
        let registry = RegistryBuilder::new()
            .with(TransactionId::HID_SYNC, &handler)
            .unwrap()
            .seal();

        let clock = AtomicTicks::new();
        let link = PeerLink::new(&registry, &clock);
        let mut initiator = Initiator::new(link, Timer::new(&clock), SyncConfig::new()).unwrap();

        let mut report = [0u8; RAW_REPORT_SIZE];
        report[31] = 42;
        forward_report(&mut initiator, &report).unwrap();

        assert_eq!(received.borrow().len(), RAW_REPORT_SIZE);
        assert_eq!(received.borrow()[31], 42);
    }

    #[test]
    fn test_slave_without_handler_times_out() {
        let registry = RegistryBuilder::new().seal();
        let clock = AtomicTicks::new();
        let link = PeerLink::new(&registry, &clock);
        let mut initiator = Initiator::new(link, Timer::new(&clock), SyncConfig::new()).unwrap();

        assert_eq!(
            forward_report(&mut initiator, &[1; RAW_REPORT_SIZE]),
            Err(TransactionError::Timeout)
        );
    }

    #[test]
    fn test_oversized_report_rejected() {
        let registry = RegistryBuilder::new().seal();
        let clock = AtomicTicks::new();
        let link = PeerLink::new(&registry, &clock);
        let mut initiator = Initiator::new(link, Timer::new(&clock), SyncConfig::new()).unwrap();

        assert_eq!(
            forward_report(&mut initiator, &[0; RAW_REPORT_SIZE + 8]),
            Err(TransactionError::PayloadTooLarge)
        );
        assert!(initiator.link().sent().is_empty());
    }

    #[test]
    fn test_oversized_request_not_ingested() {
        let calls = RefCell::new(0usize);
        let handler = HidSync::new(|_report: &[u8]| *calls.borrow_mut() += 1);

        let mut response = Payload::new();
        handler.handle(&[0; RAW_REPORT_SIZE + 8], &mut response);
        assert_eq!(*calls.borrow(), 0);

        handler.handle(&[0; RAW_REPORT_SIZE], &mut response);
        assert_eq!(*calls.borrow(), 1);
        assert!(response.is_empty());
    }
}
