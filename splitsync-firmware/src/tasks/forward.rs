//! Master-side report forwarding
//!
//! Takes raw HID reports from the host channel and pushes them to the
//! slave one transaction at a time.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use splitsync_core::hid_sync::forward_report_shared;
use splitsync_core::{SharedInitiator, Timer, TransactionError};
use splitsync_hal::AtomicTicks;

use crate::channels::HOST_REPORTS;
use crate::tasks::tick::FAST_TICKS;
use crate::uart::SplitLink;

/// Initiator for the inter-half UART
pub type MasterInitiator = SharedInitiator<CriticalSectionRawMutex, SplitLink, &'static AtomicTicks>;

/// Forward task - one transaction per host report
#[embassy_executor::task]
pub async fn forward_task(initiator: &'static MasterInitiator) {
    info!("Forward task started");

    let latency = Timer::new(&FAST_TICKS);
    let mut connected = true;

    loop {
        let report = HOST_REPORTS.receive().await;

        let start = latency.read32();
        match forward_report_shared(initiator, &report).await {
            Ok(()) => trace!("Report forwarded in {} us", latency.elapsed32(start)),
            Err(TransactionError::Disconnected) => trace!("Slave offline, report dropped"),
            Err(e) => warn!("Report forward failed: {}", e),
        }

        let now_connected = initiator.is_connected().await;
        if now_connected != connected {
            if now_connected {
                info!("Link to slave restored");
            } else {
                warn!("Link to slave lost");
            }
            connected = now_connected;
        }
    }
}
