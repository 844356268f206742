//! # SpinLock
//!
//! A test-and-test-and-set (TTAS) spinlock whose wait loop is observable.
//!
//! [`SpinLock`] provides mutual exclusion over the data it wraps using a
//! single atomic flag. Acquisition is two-phase: waiters first poll the flag
//! with a cheap relaxed load until it reads free (the *test* phase), and only
//! then attempt one atomic exchange to claim it (the *test-and-set* phase).
//! Polling a plain load keeps the cache line shared while waiting instead of
//! hammering it with contended read-modify-writes, and it makes the wait a
//! pure poll — which is what lets the spin phase be wrapped in the
//! [annotation hooks](crate::observer) so an external checker can reason
//! about it without unrolling it.
//!
//! ## Features
//! - ✅ `no_std` compatible
//! - ✅ Injectable [`SpinObserver`] (no-op by default, zero overhead)
//! - ✅ Supports `try_lock` and `try_lock_for` with custom spin limits
//! - ✅ `with_lock()` convenience method for scoped access
//! - ✅ Loom-modelable via the `loom` feature
//!
//! ## Memory ordering
//!
//! The spin-phase load is `Relaxed`: it only decides whether an exchange is
//! worth attempting, and a stale read costs at most a wasted retry. The
//! claiming exchange uses `Acquire` and the release store uses `Release`,
//! which together give each successful acquisition a happens-before edge
//! from the previous release, so data written inside one critical section is
//! visible in the next.
//!
//! ## Safety
//! - The lock is **not fair** — starvation is possible under heavy contention.
//! - It is **not reentrant**; re-locking from the holding thread deadlocks.
//! - Do not hold it across blocking or long-running operations.
//!
//! ## Example
//!
//! (Not compiled under the `loom` feature: loom's atomics are not const
//! constructible and only run inside a model.)
#![cfg_attr(not(feature = "loom"), doc = "```rust")]
#![cfg_attr(feature = "loom", doc = "```rust,ignore")]
//! use await_spinlock::SpinLock;
//!
//! static COUNTER: SpinLock<u32> = SpinLock::new(0);
//!
//! fn increment() {
//!     let mut guard = COUNTER.lock();
//!     *guard += 1;
//! }
//!
//! increment();
//! assert_eq!(*COUNTER.lock(), 1);
//! ```

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::await_while::await_while;
use crate::observer::{NoopObserver, SpinObserver};
use crate::sync::{
    AtomicBool,
    Ordering::{Acquire, Relaxed, Release},
};
use crate::BackOff;

/// A test-and-test-and-set mutual exclusion primitive.
///
/// The flag is `false` while the lock is free and `true` while it is held.
/// `O` is the [`SpinObserver`] reported to during the spin phase of
/// [`lock`](Self::lock); the default [`NoopObserver`] compiles away.
///
/// See the [module-level documentation](self) for the acquisition protocol
/// and memory-ordering choices.
pub struct SpinLock<T, O = NoopObserver> {
    data: UnsafeCell<T>,
    locked: AtomicBool,
    observer: O,
}

/// A guard that releases the [`SpinLock`] when dropped.
///
/// Returned from [`SpinLock::lock`] and friends; implements [`Deref`] and
/// [`DerefMut`] to access the protected data.
///
/// The guard's thread-safety follows the payload, not the lock: sharing a
/// `&SpinGuard` hands out `&T`, so the guard is only `Sync` when `T` is.
/// A guard over a `Cell` payload therefore cannot be shared:
///
/// ```compile_fail
/// use core::cell::Cell;
/// use await_spinlock::SpinLock;
///
/// fn shareable<G: Sync>(_: &G) {}
///
/// let lock = SpinLock::new(Cell::new(0u32));
/// let guard = lock.lock();
/// shareable(&guard);
/// ```
pub struct SpinGuard<'a, T, O = NoopObserver> {
    lock: &'a SpinLock<T, O>,
    // Suppresses the auto Send/Sync impls; the &SpinLock field alone would
    // make the guard Sync for any T: Send, exposing aliased &T to threads
    // the payload is not prepared for.
    marker: PhantomData<*mut T>,
}

impl<T, O> Drop for SpinGuard<'_, T, O> {
    #[inline]
    fn drop(&mut self) {
        // Release publishes every write made while the lock was held to the
        // next Acquire exchange that claims it.
        self.lock.locked.store(false, Release)
    }
}

impl<T> SpinLock<T> {
    /// Creates a new [`SpinLock`] wrapping the given data, with no observer
    /// attached.
    ///
    /// # Example
    #[cfg_attr(not(feature = "loom"), doc = "```")]
    #[cfg_attr(feature = "loom", doc = "```ignore")]
    /// use await_spinlock::SpinLock;
    ///
    /// let lock = SpinLock::new(123);
    /// assert_eq!(*lock.lock(), 123);
    /// ```
    #[cfg(not(feature = "loom"))]
    #[inline(always)]
    pub const fn new(data: T) -> Self {
        SpinLock {
            data: UnsafeCell::new(data),
            locked: AtomicBool::new(false),
            observer: NoopObserver,
        }
    }

    /// Creates a new [`SpinLock`] wrapping the given data.
    ///
    /// Loom's atomics cannot be constructed in const context, so this is a
    /// plain `fn` under the `loom` feature.
    #[cfg(feature = "loom")]
    #[inline(always)]
    pub fn new(data: T) -> Self {
        SpinLock {
            data: UnsafeCell::new(data),
            locked: AtomicBool::new(false),
            observer: NoopObserver,
        }
    }
}

impl<T, O: SpinObserver> SpinLock<T, O> {
    /// Creates a new [`SpinLock`] that reports its spin phases to `observer`.
    ///
    /// # Example
    #[cfg_attr(not(feature = "loom"), doc = "```")]
    #[cfg_attr(feature = "loom", doc = "```ignore")]
    /// use await_spinlock::{CountingObserver, SpinLock};
    ///
    /// let lock = SpinLock::with_observer(0u32, CountingObserver::new());
    /// *lock.lock() += 1;
    /// assert_eq!(lock.observer().exits(), lock.observer().loop_begins());
    /// ```
    #[inline]
    pub fn with_observer(data: T, observer: O) -> Self {
        SpinLock {
            data: UnsafeCell::new(data),
            locked: AtomicBool::new(false),
            observer,
        }
    }

    /// Returns the attached observer.
    #[inline(always)]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Acquires the lock, spinning until it becomes available.
    ///
    /// Each pass first waits for the flag to read free via an annotated
    /// [`await_while`] over a relaxed load, then attempts a single
    /// `swap(true, Acquire)`. Losing the race between the poll and the
    /// exchange backs off and re-enters the wait.
    ///
    /// Returns a [`SpinGuard`] which releases the lock on drop. There is no
    /// timeout: if the current holder never releases, this spins forever.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_, T, O> {
        let backoff = BackOff::new();
        loop {
            // Test phase: pure relaxed polling, observable by a checker.
            await_while(&self.observer, || self.locked.load(Relaxed));

            // Test-and-set phase: one exchange decides the race.
            if !self.locked.swap(true, Acquire) {
                return SpinGuard {
                    lock: self,
                    marker: PhantomData,
                };
            }
            backoff.wait();
        }
    }

    /// Unsafely releases the lock manually.
    ///
    /// # Safety
    /// The caller must currently hold the lock and must not use any
    /// outstanding guard afterwards. Releasing a lock held by another thread
    /// breaks mutual exclusion.
    #[inline]
    pub unsafe fn unlock(&self) {
        self.locked.store(false, Release);
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// Returns `Some(SpinGuard)` if the lock was free, or `None` otherwise.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T, O>> {
        if !self.locked.swap(true, Acquire) {
            Some(SpinGuard {
                lock: self,
                marker: PhantomData,
            })
        } else {
            None
        }
    }

    /// Checks whether the lock is currently held.
    ///
    /// The answer may be stale by the time the caller acts on it.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Relaxed)
    }

    /// Tries to acquire the lock within a fixed number of attempts.
    ///
    /// Each attempt tests the flag with a relaxed load before exchanging,
    /// like [`lock`](Self::lock), and backs off between attempts. Returns
    /// `None` once the attempt budget is spent.
    #[inline]
    pub fn try_lock_for(&self, spins: usize) -> Option<SpinGuard<'_, T, O>> {
        let backoff = BackOff::new();
        for _ in 0..spins {
            if !self.locked.load(Relaxed) && !self.locked.swap(true, Acquire) {
                return Some(SpinGuard {
                    lock: self,
                    marker: PhantomData,
                });
            }
            backoff.wait();
        }
        None
    }

    /// Runs a closure with exclusive access to the data.
    ///
    /// A convenience wrapper around [`lock`](Self::lock) that releases the
    /// lock when the closure returns.
    ///
    /// # Example
    #[cfg_attr(not(feature = "loom"), doc = "```")]
    #[cfg_attr(feature = "loom", doc = "```ignore")]
    /// use await_spinlock::SpinLock;
    /// let lock = SpinLock::new(0i32);
    /// lock.with_lock(|data| {
    ///     *data += 1;
    /// });
    /// assert_eq!(*lock.lock(), 1);
    /// ```
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }
}

impl<T, O> Deref for SpinGuard<'_, T, O> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { &*(self.lock.data.get()) }
    }
}

impl<T, O> DerefMut for SpinGuard<'_, T, O> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

// Safety: the flag enforces mutual exclusion over the UnsafeCell; the
// observer is only ever used through a shared reference.
unsafe impl<T: Send, O: Send> Send for SpinLock<T, O> {}
unsafe impl<T: Send, O: Sync> Sync for SpinLock<T, O> {}

// Safety: moving the guard moves exclusive access to the data (`T: Send`),
// and the lock it points back into is shareable. A spinlock's flag may be
// released from any thread, so the guard is not tied to its acquirer.
unsafe impl<T: Send, O: Sync> Send for SpinGuard<'_, T, O> {}
// Safety: a shared guard only hands out `&T`, which requires `T: Sync`.
unsafe impl<T: Sync, O: Sync> Sync for SpinGuard<'_, T, O> {}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use crate::{CountingObserver, SpinLock};

    #[test]
    fn basic_lock_unlock() {
        let lock = SpinLock::new(10);

        {
            let mut guard = lock.lock();
            *guard += 5;
            assert_eq!(*guard, 15);
        } // guard dropped here, automatically unlocks

        assert!(!lock.is_locked(), "lock should be released after guard drop");
    }

    #[test]
    fn guard_thread_safety_follows_payload() {
        use crate::spinlock::SpinGuard;

        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        // A Send + Sync payload keeps the guard shareable and sendable; the
        // companion compile_fail doctest on SpinGuard pins down that a
        // !Sync payload (e.g. Cell) forfeits Sync.
        assert_send::<SpinGuard<'static, u32>>();
        assert_sync::<SpinGuard<'static, u32>>();
        assert_sync::<SpinGuard<'static, (), crate::CountingObserver>>();
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = SpinLock::new(());

        let guard = lock.try_lock();
        assert!(guard.is_some());
        assert!(lock.try_lock().is_none(), "second try_lock must fail");

        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn try_lock_for_behavior() {
        let lock = SpinLock::new(42);

        let _guard = lock.lock();
        assert!(
            lock.try_lock_for(10).is_none(),
            "lock should not be acquirable while held"
        );

        drop(_guard);
        assert!(
            lock.try_lock_for(1000).is_some(),
            "lock should succeed after previous guard drop"
        );
    }

    #[test]
    fn uncontended_lock_polls_exactly_once() {
        let lock = SpinLock::with_observer(0u32, CountingObserver::new());

        for _ in 0..3 {
            *lock.lock() += 1;
        }

        let obs = lock.observer();
        assert_eq!(obs.loop_begins(), 3, "one annotated wait per acquisition");
        assert_eq!(obs.exits(), 3, "each wait exits exactly once");
        assert_eq!(obs.retries(), 0, "an uncontended flag never reads held");
        assert_eq!(obs.poll_starts(), obs.retries() + obs.exits());
    }

    #[test]
    fn annotation_counts_balance_after_contention() {
        let lock = SpinLock::with_observer((), CountingObserver::new());

        let guard = lock.lock();
        assert!(lock.try_lock_for(5).is_none());
        drop(guard);
        lock.with_lock(|_| ());

        let obs = lock.observer();
        assert_eq!(obs.poll_starts(), obs.retries() + obs.exits());
        assert_eq!(obs.loop_begins(), obs.exits());
    }

    #[cfg(feature = "std")]
    #[test]
    fn concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let lock = Arc::new(SpinLock::new(0usize));
        let mut handles = vec![];

        for _ in 0..8 {
            let lock_cloned = lock.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    let mut guard = lock_cloned.lock();
                    *guard += 1;
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(
            *lock.lock(),
            8 * 10_000,
            "counter should match total increments"
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn two_threads_double_increment() {
        use std::sync::Arc;
        use std::thread;

        struct Counters {
            x: u32,
            y: u32,
        }

        let lock = Arc::new(SpinLock::new(Counters { x: 0, y: 0 }));
        let mut handles = vec![];

        for _ in 0..2 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                let mut guard = lock.lock();
                guard.x += 1;
                guard.y += 1;
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        let guard = lock.lock();
        assert_eq!(guard.x, guard.y, "increments must not interleave");
        assert_eq!(guard.x, 2);
    }

    #[cfg(feature = "std")]
    #[test]
    fn writes_visible_to_next_acquirer() {
        use std::sync::Arc;
        use std::thread;

        let lock = Arc::new(SpinLock::new(0u64));

        let writer = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                *lock.lock() = 0xDEAD_BEEF;
            })
        };

        // Synchronize with the writer through the lock alone.
        loop {
            let guard = lock.lock();
            if *guard != 0 {
                assert_eq!(*guard, 0xDEAD_BEEF);
                break;
            }
        }

        writer.join().unwrap();
    }
}
