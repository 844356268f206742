//! # await-spinlock 🌀
//!
//! A lightweight, **`no_std`-compatible** crate pairing a test-and-test-and-set
//! spinlock with an **observable spin-wait contract**, so that external
//! verification tools (model checkers, race detectors, instrumented test
//! harnesses) can reason about its busy-wait loops without unrolling them.
//!
//! The crate includes:
//!
//! - [`SpinLock<T, O>`](SpinLock) — a TTAS spinlock with an injectable spin
//!   observer and RAII guard.
//! - [`await_while()`] — a scoped busy-wait helper that surrounds every
//!   condition evaluation with the observer hooks.
//! - [`SpinObserver`] — the three-hook annotation contract
//!   (`loop_begin` / `poll_start` / `poll_end(retrying)`), plus ready-made
//!   [`NoopObserver`], [`CountingObserver`], [`RecordingObserver`] and
//!   [`TraceObserver`] implementations.
//! - [`BackOff`] — an adaptive exponential backoff for the exchange-retry
//!   path.
//!
//! ## ✨ Features
//!
//! - ✅ `no_std` compatible (uses `core` only)
//! - ⚙️ Optional `std` feature for yielding and the recording observer
//! - 🔍 `loom` feature swaps the atomics for loom's, making the lock
//!   exhaustively model-checkable
//! - 📣 `tracing` feature adds a `tracing`-backed observer
//!
//! ## 🚀 Quick Example
//!
//! (Not compiled under the `loom` feature: loom's atomics only run inside a
//! model.)
#![cfg_attr(not(feature = "loom"), doc = "```rust")]
#![cfg_attr(feature = "loom", doc = "```rust,ignore")]
//! use await_spinlock::{CountingObserver, SpinLock};
//!
//! // A plain lock: the observer hooks compile away.
//! let lock = SpinLock::new(0);
//! {
//!     let mut guard = lock.lock();
//!     *guard += 1;
//! } // automatically unlocked when guard is dropped
//! assert_eq!(*lock.lock(), 1);
//!
//! // An observed lock: every spin phase is reported.
//! let observed = SpinLock::with_observer(0u32, CountingObserver::new());
//! *observed.lock() += 1;
//! assert_eq!(observed.observer().loop_begins(), 1);
//! ```
//!
//! ## 🧠 Design
//!
//! ### The spin-wait contract
//!
//! A busy-wait loop is semantically unbounded: a checker that tries to
//! enumerate its iterations never terminates. The [`SpinObserver`] hooks mark
//! the loop's entry (`loop_begin`), each condition evaluation
//! (`poll_start` / `poll_end(true)`) and the exiting evaluation
//! (`poll_end(false)`), letting a checker collapse the loop into a single
//! "wait until condition" step while still seeing the final transition
//! exactly once. The contract is only sound for pure polls: the condition
//! must re-read shared state with the same semantics on every evaluation and
//! do nothing else.
//!
//! ### The lock
//!
//! [`SpinLock`] waits on a relaxed load of its flag through [`await_while()`]
//! (the *test* phase) and claims it with a single `Acquire` exchange (the
//! *test-and-set* phase), storing `Release` on unlock. The relaxed polling
//! keeps the wait side-effect free, which is exactly what the contract
//! requires; the ordering choices are documented in [`spinlock`].
//!
//! ## ⚠️ Safety & Usage Notes
//!
//! - Prefer `SpinLock` for **short critical sections** only.
//! - Never hold a spinlock during blocking or long-running operations.
//! - `SpinLock` is **not reentrant** and **not fair**.
//! - Calling `unlock` without holding the lock is a protocol violation and
//!   is not detected.
//!
//! ## 📦 Modules
//!
//! - [`observer`] — the annotation contract and observer implementations.
//! - [`await_while`](mod@await_while) — the scoped annotated wait.
//! - [`spinlock`] — the TTAS lock and its guard.
//! - [`backoff`] — adaptive exponential backoff.
//! - [`sync`] — atomic facade (core, or loom under the `loom` feature).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod await_while;
pub mod backoff;
pub mod observer;
pub mod spinlock;
pub mod sync;

pub use await_while::await_while;
pub use backoff::BackOff;
pub use observer::{CountingObserver, NoopObserver, SpinEvent, SpinObserver};
#[cfg(feature = "std")]
pub use observer::RecordingObserver;
#[cfg(feature = "tracing")]
pub use observer::TraceObserver;
pub use spinlock::{SpinGuard, SpinLock};
