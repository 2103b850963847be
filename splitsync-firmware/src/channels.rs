//! Inter-task communication channels

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use splitsync_core::hid_sync::RAW_REPORT_SIZE;

/// Raw HID report, up to [`RAW_REPORT_SIZE`] bytes
pub type RawReport = heapless::Vec<u8, RAW_REPORT_SIZE>;

/// Channel capacity for reports waiting to be forwarded
const HOST_REPORT_CHANNEL_SIZE: usize = 4;

/// Raw HID reports from the host, to be forwarded to the slave
///
/// Producer: the USB raw HID interface on the master, which sends every
/// OUT report it receives. That interface is not part of this firmware, so
/// until one is linked in the forward task stays idle.
pub static HOST_REPORTS: Channel<CriticalSectionRawMutex, RawReport, HOST_REPORT_CHANNEL_SIZE> =
    Channel::new();

/// Latest report forwarded by the master, consumed on the slave
pub static SLAVE_REPORT: Signal<CriticalSectionRawMutex, RawReport> = Signal::new();
