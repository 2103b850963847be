//! Tick counter abstractions
//!
//! A tick source is a free-running 32-bit counter. On hardware it is
//! advanced by a periodic interrupt (or read from a microsecond timer);
//! in tests it is a value the test sets directly.

use portable_atomic::{AtomicU32, Ordering};

/// Free-running tick counter
///
/// Methods take `&self` because the counter is shared with the interrupt
/// that advances it. Values wrap modulo 2^32.
pub trait TickSource {
    /// Current counter value
    fn read_ticks(&self) -> u32;

    /// Overwrite the counter
    ///
    /// Used by timer restore and clear. Counting continues from `ticks`.
    fn write_ticks(&self, ticks: u32);
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn read_ticks(&self) -> u32 {
        (**self).read_ticks()
    }

    fn write_ticks(&self, ticks: u32) {
        (**self).write_ticks(ticks)
    }
}

/// Interrupt-driven tick counter
///
/// Intended to live in a `static` and be advanced from a timer interrupt
/// (or periodic task) with [`AtomicTicks::tick`].
#[derive(Debug, Default)]
pub struct AtomicTicks {
    count: AtomicU32,
}

impl AtomicTicks {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a counter starting at `ticks`
    pub const fn starting_at(ticks: u32) -> Self {
        Self {
            count: AtomicU32::new(ticks),
        }
    }

    /// Advance the counter by one tick, wrapping at `u32::MAX`
    pub fn tick(&self) {
        self.advance(1);
    }

    /// Advance the counter by `ticks`, wrapping at `u32::MAX`
    pub fn advance(&self, ticks: u32) {
        // fetch_add wraps on overflow
        self.count.fetch_add(ticks, Ordering::Relaxed);
    }
}

impl TickSource for AtomicTicks {
    fn read_ticks(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    fn write_ticks(&self, ticks: u32) {
        self.count.store(ticks, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances() {
        let ticks = AtomicTicks::new();
        ticks.tick();
        ticks.tick();
        assert_eq!(ticks.read_ticks(), 2);
    }

    #[test]
    fn test_advance_wraps() {
        let ticks = AtomicTicks::starting_at(u32::MAX - 1);
        ticks.advance(3);
        assert_eq!(ticks.read_ticks(), 1);
    }

    #[test]
    fn test_write_then_read() {
        let ticks = AtomicTicks::new();
        ticks.write_ticks(12_345);
        assert_eq!(ticks.read_ticks(), 12_345);
    }

    #[test]
    fn test_reference_is_tick_source() {
        fn read<S: TickSource>(source: S) -> u32 {
            source.read_ticks()
        }

        let ticks = AtomicTicks::starting_at(7);
        assert_eq!(read(&ticks), 7);
    }
}
