//! Wraparound-safe tick timer
//!
//! The tick counter wraps; a keyboard left plugged in for a few weeks will
//! see a 32-bit millisecond counter roll over, and the 16-bit view rolls
//! over every 65 seconds. All duration math therefore happens in modular
//! arithmetic in the width of the operands:
//!
//! - `elapsed = now - past` (wrapping) is correct as long as the real
//!   elapsed time is below the counter range
//! - a deadline has passed when `now - deadline` (wrapping) is below half
//!   the range, which holds across a rollover as long as deadlines are
//!   checked at least once per half range
//!
//! Never compare ticks with `>=` directly.

use core::fmt::Debug;

use splitsync_hal::TickSource;

/// Fast timer value (full 32-bit resolution)
pub type FastTick = u32;

/// Fixed-width tick value
pub trait Ticks: Copy + Eq + Ord + Debug {
    /// Largest representable tick
    const MAX: Self;
    /// Half of [`Ticks::MAX`], the expiry boundary
    const HALF: Self;

    /// Truncate a raw 32-bit counter to this width
    fn from_raw(raw: u32) -> Self;

    /// Widen back to 32 bits
    fn into_raw(self) -> u32;

    /// Modular difference `self - past`
    fn diff(self, past: Self) -> Self;

    /// Modular sum `self + delta`
    fn offset(self, delta: Self) -> Self;

    /// Whether `deadline` has been reached at `self`
    ///
    /// True iff `self - deadline` (modular) is strictly less than
    /// [`Ticks::HALF`].
    fn expired(self, deadline: Self) -> bool {
        self.diff(deadline) < Self::HALF
    }
}

macro_rules! impl_ticks {
    ($($ty:ty),*) => {
        $(
            impl Ticks for $ty {
                const MAX: Self = <$ty>::MAX;
                const HALF: Self = <$ty>::MAX / 2;

                fn from_raw(raw: u32) -> Self {
                    raw as $ty
                }

                fn into_raw(self) -> u32 {
                    self as u32
                }

                fn diff(self, past: Self) -> Self {
                    self.wrapping_sub(past)
                }

                fn offset(self, delta: Self) -> Self {
                    self.wrapping_add(delta)
                }
            }
        )*
    };
}

impl_ticks!(u8, u16, u32);

/// 16-bit deadline check
pub fn expired(current: u16, deadline: u16) -> bool {
    current.expired(deadline)
}

/// 32-bit deadline check
pub fn expired32(current: u32, deadline: u32) -> bool {
    current.expired(deadline)
}

/// Timer service over one tick source
///
/// Owns the single saved-tick slot for its counter.
#[derive(Debug)]
pub struct Timer<S> {
    source: S,
    saved: u32,
}

impl<S: TickSource> Timer<S> {
    /// Wrap a tick source
    pub fn new(source: S) -> Self {
        Self { source, saved: 0 }
    }

    /// Underlying tick source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current counter, 16-bit view
    pub fn read(&self) -> u16 {
        self.read_as()
    }

    /// Current counter, full 32 bits
    pub fn read32(&self) -> u32 {
        self.source.read_ticks()
    }

    /// Current counter truncated to any supported width
    pub fn read_as<T: Ticks>(&self) -> T {
        T::from_raw(self.source.read_ticks())
    }

    /// Ticks since `past`, 16-bit
    pub fn elapsed(&self, past: u16) -> u16 {
        self.elapsed_as(past)
    }

    /// Ticks since `past`, 32-bit
    pub fn elapsed32(&self, past: u32) -> u32 {
        self.elapsed_as(past)
    }

    /// Ticks since `past` in the width of `past`
    pub fn elapsed_as<T: Ticks>(&self, past: T) -> T {
        self.read_as::<T>().diff(past)
    }

    /// Deadline `after` ticks from now
    pub fn deadline32(&self, after: u32) -> u32 {
        self.read32().offset(after)
    }

    /// Whether `deadline` has been reached
    pub fn has_expired32(&self, deadline: u32) -> bool {
        self.read32().expired(deadline)
    }

    /// Reset the counter to zero
    pub fn clear(&self) {
        self.source.write_ticks(0);
    }

    /// Snapshot the counter into the saved slot
    ///
    /// A later save overwrites the slot.
    pub fn save(&mut self) {
        self.saved = self.source.read_ticks();
    }

    /// Make the saved snapshot the current counter value
    ///
    /// Time spent between `save` and `restore` is not counted.
    pub fn restore(&mut self) {
        self.source.write_ticks(self.saved);
    }
}

/// Coarse and fast timers of one half
///
/// The coarse counter is the periodic-interrupt millisecond tick; the fast
/// counter has higher resolution for latency measurements. Each wraps
/// independently.
#[derive(Debug)]
pub struct Clocks<C, F> {
    coarse: Timer<C>,
    fast: Timer<F>,
}

impl<C: TickSource, F: TickSource> Clocks<C, F> {
    /// Bundle the two tick sources
    pub fn new(coarse: C, fast: F) -> Self {
        Self {
            coarse: Timer::new(coarse),
            fast: Timer::new(fast),
        }
    }

    /// Coarse timer
    pub fn coarse(&self) -> &Timer<C> {
        &self.coarse
    }

    /// Fast timer
    pub fn fast(&self) -> &Timer<F> {
        &self.fast
    }

    /// Current fast counter
    pub fn read_fast(&self) -> FastTick {
        self.fast.read32()
    }

    /// Fast ticks since `last`
    pub fn elapsed_fast(&self, last: FastTick) -> FastTick {
        self.fast.elapsed32(last)
    }

    /// Snapshot both counters before suspend
    pub fn save(&mut self) {
        self.coarse.save();
        self.fast.save();
    }

    /// Resume both counters from their snapshots
    pub fn restore(&mut self) {
        self.coarse.restore();
        self.fast.restore();
    }

    /// Split back into the two timers
    pub fn into_parts(self) -> (Timer<C>, Timer<F>) {
        (self.coarse, self.fast)
    }
}
