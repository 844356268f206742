//! # BackOff
//!
//! A lightweight, `no_std`-compatible exponential backoff for retry paths.
//!
//! [`SpinLock::lock`](crate::SpinLock::lock) uses this between exchange
//! attempts: when the claiming swap loses the race, the loser backs off for
//! a progressively longer pause before re-entering the annotated wait. The
//! pause runs entirely outside the annotated loop body, so the wait itself
//! stays a pure poll.
//!
//! ## Behavior
//! - Each call to [`BackOff::wait`] spins for a number of iterations given by
//!   the internal counter, which doubles after every call up to a fixed
//!   limit. Spinning uses [`core::hint::spin_loop`], a CPU pause hint with no
//!   effect on the memory model.
//! - With the `std` feature, [`std::thread::yield_now`] is called once the
//!   spin count passes a yield threshold, ceding the core under persistent
//!   contention.
//! - [`BackOff::relax`] halves the current intensity; [`BackOff::reset`]
//!   restores the starting value.
//!
//! ## Example
//! ```rust
//! use await_spinlock::BackOff;
//!
//! let backoff = BackOff::new();
//! loop {
//!     if try_acquire() {
//!         break;
//!     }
//!     backoff.wait();
//! }
//!
//! fn try_acquire() -> bool {
//!     // pseudo lock acquisition
//!     true
//! }
//! ```

use core::{cell::Cell, hint::spin_loop};

/// Maximum spin iteration limit.
const MAX_SPIN: u32 = 1 << 22;

/// Default starting spin count.
const START_VALUE: u32 = 1 << 5;

/// Yield threshold used only under the `std` feature.
#[cfg(feature = "std")]
const YIELD_THRESHOLD: u32 = 1 << 10;

/// Bit shift applied during [`BackOff::relax`] to reduce spin intensity.
const RELAX_DIV_BIT_VAL: u32 = 1;

/// An exponential backoff manager.
///
/// Maintains an internal counter controlling how long to spin on subsequent
/// retries; each [`wait`](BackOff::wait) doubles it up to [`MAX_SPIN`]. On
/// `std` builds, prolonged contention additionally yields the thread.
pub struct BackOff {
    spin: Cell<u32>,
}

impl BackOff {
    /// Creates a new [`BackOff`] with the default starting spin count.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            spin: Cell::new(START_VALUE),
        }
    }

    /// Creates a new [`BackOff`] with a custom starting spin value.
    ///
    /// Useful when tuning contention recovery behavior.
    #[inline(always)]
    pub const fn new_with(start: u32) -> Self {
        Self {
            spin: Cell::new(start),
        }
    }

    /// Pauses for the current spin duration, then doubles it.
    ///
    /// Under the `std` feature this also yields the thread once contention
    /// persists past the yield threshold.
    #[inline(always)]
    pub fn wait(&self) {
        let end = self.spin.get();

        for _ in 0..end {
            spin_loop();
        }

        self.spin.set((end << 1).min(MAX_SPIN));

        #[cfg(feature = "std")]
        if end > YIELD_THRESHOLD {
            std::thread::yield_now();
        }
    }

    /// Halves the current spin intensity.
    ///
    /// Call after a successful operation to recover from aggressive backoff.
    #[inline(always)]
    pub fn relax(&self) {
        let c_spin = self.spin.get();
        self.spin.set(c_spin >> RELAX_DIV_BIT_VAL);
    }

    /// Returns the current spin iteration value.
    #[inline(always)]
    pub fn current(&self) -> u32 {
        self.spin.get()
    }

    /// Resets the spin count to the default starting value.
    #[inline(always)]
    pub fn reset(&self) {
        self.spin.set(START_VALUE);
    }

    /// Resets the spin count to a specified value.
    #[inline(always)]
    pub fn reset_to(&self, spin: u32) {
        self.spin.set(spin);
    }

    /// Explicitly yields the current thread (only available with `std`).
    #[cfg(feature = "std")]
    #[inline]
    pub fn yield_now(&self) {
        std::thread::yield_now();
    }
}

impl Default for BackOff {
    fn default() -> Self {
        Self::new()
    }
}
