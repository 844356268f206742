//! Example demonstrating the observed `SpinLock` from the `await-spinlock`
//! crate.
//!
//! Two threads race through a lock/increment/unlock cycle over a pair of
//! shared counters. Mutual exclusion keeps the counters in lockstep: after
//! both threads join, `x == y == 2`. The attached [`CountingObserver`] shows
//! how many times the spin phase re-polled the flag along the way.

use await_spinlock::{CountingObserver, SpinLock};
use std::sync::Arc;
use std::thread;

const NTHREADS: usize = 2;

/// The state protected by the lock. Shared explicitly through an `Arc`
/// rather than a process-wide static.
#[derive(Default)]
struct Counters {
    x: u64,
    y: u64,
}

fn main() {
    let lock = Arc::new(SpinLock::with_observer(
        Counters::default(),
        CountingObserver::new(),
    ));

    let mut threads = Vec::with_capacity(NTHREADS);
    for _ in 0..NTHREADS {
        let lock = Arc::clone(&lock);
        threads.push(thread::spawn(move || {
            let mut guard = lock.lock();
            guard.x += 1;
            guard.y += 1;
        }));
    }

    for t in threads {
        let _ = t.join();
    }

    let guard = lock.lock();
    assert_eq!(guard.x, guard.y);
    assert_eq!(guard.x, NTHREADS as u64);
    drop(guard);

    let obs = lock.observer();
    println!(
        "x == y == {NTHREADS}; spin waits: {} entered, {} re-polls, {} exits",
        obs.loop_begins(),
        obs.retries(),
        obs.exits()
    );
}
