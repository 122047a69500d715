#![forbid(unsafe_code)]

//! Counting gate bounding how many tasks execute at once.
//!
//! [`Gate::acquire`] blocks on a condition variable until a slot is free and
//! returns a [`Permit`]. Dropping the permit releases the slot, so a slot is
//! returned on every exit path of the holder, including unwinding.
//!
//! Waiters are woken in whatever order the condition variable chooses; no
//! first-come-first-served ordering is promised.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counting semaphore with a fixed capacity of at least one.
#[derive(Debug)]
pub struct Gate {
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

impl Gate {
    /// Create a gate with `capacity` slots. A capacity of zero becomes one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            available: Mutex::new(capacity),
            released: Condvar::new(),
        }
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        *self.lock()
    }

    /// Block until a slot is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut available = self.lock();
        while *available == 0 {
            available = self
                .released
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        Permit { gate: self }
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut available = self.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(Permit { gate: self })
    }

    fn release(&self) {
        let mut available = self.lock();
        *available += 1;
        debug_assert!(*available <= self.capacity, "gate over-released");
        self.released.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.available.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held slot of a [`Gate`]; released on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit<'a> {
    gate: &'a Gate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn zero_capacity_becomes_one() {
        let gate = Gate::new(0);
        assert_eq!(gate.capacity(), 1);
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn try_acquire_exhausts_and_drop_releases() {
        let gate = Gate::new(2);
        let a = gate.try_acquire().expect("first slot");
        let b = gate.try_acquire().expect("second slot");
        assert!(gate.try_acquire().is_none());
        assert_eq!(gate.available(), 0);
        drop(a);
        assert_eq!(gate.available(), 1);
        drop(b);
        assert_eq!(gate.available(), 2);
    }

    #[test]
    fn slot_released_when_holder_panics() {
        let gate = Gate::new(1);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _permit = gate.acquire();
            panic!("holder failed");
        }));
        assert!(result.is_err());
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn acquire_blocks_until_release() {
        let gate = Arc::new(Gate::new(1));
        let permit = gate.try_acquire().expect("slot");
        let admitted = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let gate = Arc::clone(&gate);
            let admitted = Arc::clone(&admitted);
            thread::spawn(move || {
                let _permit = gate.acquire();
                admitted.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(admitted.load(Ordering::SeqCst), 0);
        drop(permit);
        waiter.join().unwrap();
        assert_eq!(admitted.load(Ordering::SeqCst), 1);
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn concurrent_holders_never_exceed_capacity() {
        let gate = Arc::new(Gate::new(3));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    let _permit = gate.acquire();
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    current.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gate.available(), 3);
    }
}
