//! # await_while
//!
//! A scoped busy-wait helper that makes the shape of the loop observable.
//!
//! [`await_while`] spins while a condition holds, surrounding every
//! evaluation with the [`SpinObserver`] hooks. An external checker attached
//! to those hooks can then collapse "poll, find true, poll again" into a
//! single semantic wait step instead of unrolling the loop, while still
//! seeing the final condition-became-false transition exactly once.
//!
//! ## Hook ordering
//!
//! Per call: `loop_begin` once, then for each iteration `poll_start`, one
//! evaluation of the condition, `poll_end(retrying)`. The call returns
//! immediately after `poll_end(false)`.
//!
//! ## Condition purity
//!
//! The condition closure must be a pure poll: re-read some shared state and
//! report whether to keep waiting, with the same read semantics on every
//! evaluation and no other side effects. The annotation is only sound for
//! such loops; a condition that mutates state makes the collapsed-wait view
//! unsound. Between a retrying evaluation and the next `poll_start` the
//! helper issues a CPU relax hint, which does not touch program state.
//!
//! ## Example
//!
//! ```rust
//! use core::sync::atomic::{AtomicBool, Ordering::Relaxed};
//! use await_spinlock::{await_while, NoopObserver};
//!
//! let flag = AtomicBool::new(false);
//! // Returns immediately: the condition is already false.
//! await_while(&NoopObserver, || flag.load(Relaxed));
//! ```

use crate::observer::SpinObserver;
use crate::sync;

/// Spins while `cond` returns `true`, reporting the loop structure to
/// `observer`.
///
/// Returns once `cond` evaluates to `false`. If `cond` never becomes false
/// this spins forever; bounding the wait is the caller's (or an attached
/// checker's) concern.
#[inline]
pub fn await_while<O, F>(observer: &O, mut cond: F)
where
    O: SpinObserver,
    F: FnMut() -> bool,
{
    observer.loop_begin();
    loop {
        observer.poll_start();
        let retrying = cond();
        observer.poll_end(retrying);
        if !retrying {
            return;
        }
        sync::spin_loop();
    }
}
