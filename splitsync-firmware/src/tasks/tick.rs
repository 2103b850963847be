//! Tick sources for the link timers
//!
//! The coarse counter advances once per millisecond from [`tick_task`]
//! and drives response timeouts. The fast counter reads the embassy
//! time driver directly in microseconds and is used for latency
//! measurements.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};
use portable_atomic::{AtomicU32, Ordering};
use splitsync_hal::{AtomicTicks, TickSource};

/// Coarse tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1;

/// Millisecond counter
pub static COARSE_TICKS: AtomicTicks = AtomicTicks::new();

/// Microsecond counter
pub static FAST_TICKS: FastTicks = FastTicks::new();

/// Microsecond view of the time driver
///
/// The driver clock cannot be written, so writes store an offset that is
/// applied to every later read.
pub struct FastTicks {
    offset: AtomicU32,
}

impl FastTicks {
    const fn new() -> Self {
        Self {
            offset: AtomicU32::new(0),
        }
    }

    fn now() -> u32 {
        // Truncation gives the modulo 2^32 counter the timer expects
        Instant::now().as_micros() as u32
    }
}

impl TickSource for FastTicks {
    fn read_ticks(&self) -> u32 {
        Self::now().wrapping_sub(self.offset.load(Ordering::Relaxed))
    }

    fn write_ticks(&self, ticks: u32) {
        self.offset
            .store(Self::now().wrapping_sub(ticks), Ordering::Relaxed);
    }
}

/// Tick task - advances the coarse counter every millisecond
#[embassy_executor::task]
pub async fn tick_task() {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        ticker.next().await;
        COARSE_TICKS.tick();
    }
}
