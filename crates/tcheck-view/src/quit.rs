#![forbid(unsafe_code)]

//! One-shot quit signal.
//!
//! Set from the input thread on a quit key and from [`stop`] callers; the
//! owning thread blocks on it. Setting it more than once is a no-op.
//!
//! [`stop`]: crate::TaskListView::stop

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Cloneable handle to a shared quit flag.
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the signal and wake all waiters. Returns true only for the call
    /// that actually set it.
    pub fn signal(&self) -> bool {
        let (_, cvar) = &*self.inner;
        let mut set = self.lock();
        if *set {
            return false;
        }
        *set = true;
        cvar.notify_all();
        true
    }

    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Block until the signal is set.
    pub fn wait(&self) {
        let (_, cvar) = &*self.inner;
        let mut set = self.lock();
        while !*set {
            set = cvar.wait(set).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Wait for the signal or a timeout.
    ///
    /// Returns `true` if set, `false` if timed out. Spurious wakeups are
    /// absorbed by looping until the deadline.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (_, cvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut set = self.lock();
        while !*set {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            set = cvar
                .wait_timeout(set, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
