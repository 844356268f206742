//! Atomic types with optional loom support.
//!
//! Re-exports the atomics used by the lock so that production builds run on
//! `core` atomics while the `loom` feature swaps in loom's instrumented
//! versions, letting loom exhaustively explore lock interleavings.

#[cfg(not(feature = "loom"))]
pub use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "loom")]
pub use loom::sync::atomic::{AtomicBool, Ordering};

/// CPU relax hint. Under loom this becomes a scheduling point instead,
/// so spin loops stay explorable rather than starving the model.
#[cfg(not(feature = "loom"))]
#[inline]
pub fn spin_loop() {
    core::hint::spin_loop();
}

#[cfg(feature = "loom")]
#[inline]
pub fn spin_loop() {
    loom::thread::yield_now();
}
