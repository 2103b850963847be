//! Slave-side consumer of forwarded reports

use defmt::*;

use crate::channels::SLAVE_REPORT;

/// Report task - picks up reports the master forwarded
#[embassy_executor::task]
pub async fn report_task() {
    info!("Report task started");

    loop {
        let report = SLAVE_REPORT.wait().await;
        debug!("Host report: {:02x}", report.as_slice());
    }
}
