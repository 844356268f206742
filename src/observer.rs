//! # SpinObserver
//!
//! Injectable hooks that expose the structure of a busy-wait loop to an
//! external analysis tool.
//!
//! A model checker that wants to reason about a spin loop without unrolling it
//! needs to see three things: that a semantically-unbounded wait is starting,
//! that the wait condition is about to be re-evaluated, and whether that
//! evaluation decided to retry or to exit. [`SpinObserver`] is that surface,
//! expressed as a strategy object rather than hard-wired global calls, so a
//! standalone build pays nothing and a verification-integrated build can
//! substitute whatever instrumentation its checker expects.
//!
//! ## Provided observers
//!
//! - [`NoopObserver`] — the default; every hook compiles to nothing.
//! - [`CountingObserver`] — per-hook atomic counters, enough to check the
//!   one-evaluation-per-iteration property.
//! - [`RecordingObserver`] — captures the full ordered [`SpinEvent`] stream
//!   (`std` only).
//! - [`TraceObserver`] — forwards each hook to [`tracing`] at `TRACE` level
//!   (`tracing` feature).
//!
//! ## Contract
//!
//! For a single pass through an annotated wait, a conforming caller (see
//! [`await_while`](crate::await_while)) emits exactly:
//!
//! ```text
//! loop_begin
//! (poll_start, poll_end(true))*   // one pair per re-check that found the
//!                                 // condition still holding
//! poll_start, poll_end(false)     // the evaluation that exits the loop
//! ```
//!
//! Hooks must not alter control flow or touch the state being polled; they
//! are a side channel, not a participant.

use core::sync::atomic::{AtomicUsize, Ordering::Relaxed};

/// Hooks surrounding an annotated busy-wait loop.
///
/// All three methods are semantically no-ops from the program's point of
/// view: implementations may record, count, or report, but must not affect
/// the polled condition or the decision to retry.
pub trait SpinObserver {
    /// Called exactly once, before the first evaluation of the wait
    /// condition.
    fn loop_begin(&self);

    /// Called immediately before each evaluation of the wait condition.
    fn poll_start(&self);

    /// Called immediately after each evaluation. `retrying` is `true` when
    /// the condition still holds and the loop will iterate again, `false`
    /// when control is about to exit the loop.
    fn poll_end(&self, retrying: bool);
}

/// Observers are usable through shared references.
impl<O: SpinObserver + ?Sized> SpinObserver for &O {
    #[inline(always)]
    fn loop_begin(&self) {
        (**self).loop_begin()
    }
    #[inline(always)]
    fn poll_start(&self) {
        (**self).poll_start()
    }
    #[inline(always)]
    fn poll_end(&self, retrying: bool) {
        (**self).poll_end(retrying)
    }
}

/// The default observer: all hooks are empty and inline away entirely.
///
/// A lock built over `NoopObserver` has exactly the cost of an unannotated
/// spin loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SpinObserver for NoopObserver {
    #[inline(always)]
    fn loop_begin(&self) {}
    #[inline(always)]
    fn poll_start(&self) {}
    #[inline(always)]
    fn poll_end(&self, _retrying: bool) {}
}

/// Counts hook invocations.
///
/// Useful for asserting the annotation contract: after any number of
/// annotated waits, `poll_starts == poll_ends` and
/// `retries + exits == poll_ends`, with one exit per completed wait.
#[derive(Debug, Default)]
pub struct CountingObserver {
    loop_begins: AtomicUsize,
    poll_starts: AtomicUsize,
    retries: AtomicUsize,
    exits: AtomicUsize,
}

impl CountingObserver {
    pub const fn new() -> Self {
        Self {
            loop_begins: AtomicUsize::new(0),
            poll_starts: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
            exits: AtomicUsize::new(0),
        }
    }

    /// Number of `loop_begin` calls, i.e. annotated waits entered.
    pub fn loop_begins(&self) -> usize {
        self.loop_begins.load(Relaxed)
    }

    /// Number of condition evaluations started.
    pub fn poll_starts(&self) -> usize {
        self.poll_starts.load(Relaxed)
    }

    /// Number of evaluations that found the condition still holding.
    pub fn retries(&self) -> usize {
        self.retries.load(Relaxed)
    }

    /// Number of evaluations that exited a wait.
    pub fn exits(&self) -> usize {
        self.exits.load(Relaxed)
    }
}

impl SpinObserver for CountingObserver {
    #[inline]
    fn loop_begin(&self) {
        self.loop_begins.fetch_add(1, Relaxed);
    }
    #[inline]
    fn poll_start(&self) {
        self.poll_starts.fetch_add(1, Relaxed);
    }
    #[inline]
    fn poll_end(&self, retrying: bool) {
        if retrying {
            self.retries.fetch_add(1, Relaxed);
        } else {
            self.exits.fetch_add(1, Relaxed);
        }
    }
}

/// One entry in the annotation event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinEvent {
    LoopBegin,
    PollStart,
    PollEnd { retrying: bool },
}

/// Records the ordered event stream of every annotated wait it observes.
///
/// Events from concurrent waiters interleave in the order the recorder saw
/// them; per-thread ordering of each wait's own events is preserved.
#[cfg(feature = "std")]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: std::sync::Mutex<Vec<SpinEvent>>,
}

#[cfg(feature = "std")]
impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<SpinEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drops all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: SpinEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(feature = "std")]
impl SpinObserver for RecordingObserver {
    fn loop_begin(&self) {
        self.push(SpinEvent::LoopBegin);
    }
    fn poll_start(&self) {
        self.push(SpinEvent::PollStart);
    }
    fn poll_end(&self, retrying: bool) {
        self.push(SpinEvent::PollEnd { retrying });
    }
}

/// Forwards each hook to [`tracing`] at `TRACE` level.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceObserver;

#[cfg(feature = "tracing")]
impl SpinObserver for TraceObserver {
    fn loop_begin(&self) {
        tracing::trace!(target: "await_spinlock", "spin wait: loop begin");
    }
    fn poll_start(&self) {
        tracing::trace!(target: "await_spinlock", "spin wait: poll start");
    }
    fn poll_end(&self, retrying: bool) {
        tracing::trace!(target: "await_spinlock", retrying, "spin wait: poll end");
    }
}
