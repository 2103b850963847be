//! splitsync - Split Keyboard Link Firmware
//!
//! Runs on both halves of an RP2040 split keyboard. split.toml selects the
//! role at build time: the master forwards host reports over the
//! inter-half UART and the slave answers them.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use splitsync_core::hid_sync::HidSync;
use splitsync_core::link::UartLink;
use splitsync_core::{Initiator, RegistryBuilder, Responder, SharedInitiator, SyncConfig, Timer};
use splitsync_protocol::TransactionId;

use crate::channels::{RawReport, SLAVE_REPORT};
use crate::tasks::forward::MasterInitiator;
use crate::tasks::tick::COARSE_TICKS;
use crate::uart::{SplitLink, SplitRx, SplitTx};

mod channels;
mod config;
mod tasks;
mod uart;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Slave poll interval in microseconds
const SLAVE_POLL_US: u64 = 250;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

static INITIATOR: StaticCell<MasterInitiator> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("splitsync firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Inter-half link: TRRS tip on GPIO0 (TX) / GPIO1 (RX)
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart_config = uart::rp_config(&config::uart_config());
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let link = UartLink::new(SplitTx(tx), SplitRx(rx));

    info!("UART initialized at {} baud", config::BAUD_RATE);

    spawner.spawn(tasks::tick_task()).unwrap();

    if config::IS_MASTER {
        run_master(spawner, link, config::sync_config()).await
    } else {
        run_slave(spawner, link).await
    }
}

/// Master half: hand the link to the forward task
async fn run_master(spawner: Spawner, link: SplitLink, sync_config: SyncConfig) -> ! {
    info!("Role: master");

    let initiator = unwrap!(Initiator::new(link, Timer::new(&COARSE_TICKS), sync_config));
    let initiator = INITIATOR.init(SharedInitiator::new(initiator));
    spawner.spawn(tasks::forward_task(initiator)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Slave half: answer requests from the master
///
/// The registry borrows handlers living in this frame, so the responder
/// runs here instead of in a spawned task.
async fn run_slave(spawner: Spawner, link: SplitLink) -> ! {
    info!("Role: slave");

    // HidSync drops anything longer than RAW_REPORT_SIZE before calling this
    let hid_sync = HidSync::new(|report: &[u8]| match RawReport::from_slice(report) {
        Ok(raw) => SLAVE_REPORT.signal(raw),
        Err(()) => warn!("Report of {} bytes does not fit", report.len()),
    });

    let registry = unwrap!(RegistryBuilder::new().with(TransactionId::HID_SYNC, &hid_sync)).seal();
    info!("Registry sealed with {} transactions", registry.len());

    spawner.spawn(tasks::report_task()).unwrap();

    info!("All tasks spawned, firmware running");

    let mut responder = Responder::new(link, &registry);
    let mut ticker = Ticker::every(Duration::from_micros(SLAVE_POLL_US));

    loop {
        responder.poll();
        ticker.next().await;
    }
}
