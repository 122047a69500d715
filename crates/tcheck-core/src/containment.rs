#![forbid(unsafe_code)]

//! Quiet panic boundary for check functions.
//!
//! [`Task::run`](crate::Task::run) records a panicking check as a failure, but
//! the process panic hook runs before the unwind is caught and would print
//! the message and a backtrace to stderr, straight into a live terminal
//! frame. While a check executes its thread is marked with a
//! [`ContainedScope`]; the hook installed here logs panics on marked threads
//! and forwards every other panic to the hook it replaced.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::OnceLock;

thread_local! {
    /// Number of active contained scopes on this thread.
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII marker for a running check on the current thread.
#[must_use]
pub struct ContainedScope {
    /// Thread-local state; must be dropped on the thread that created it.
    _marker: PhantomData<*const ()>,
}

impl Drop for ContainedScope {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Mark the current thread until the returned scope is dropped.
pub fn enter() -> ContainedScope {
    install_quiet_hook();
    DEPTH.with(|depth| depth.set(depth.get() + 1));
    ContainedScope {
        _marker: PhantomData,
    }
}

/// Returns true while the current thread is inside a contained scope.
pub fn is_contained() -> bool {
    DEPTH.with(|depth| depth.get() > 0)
}

fn install_quiet_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if is_contained() {
                crate::debug!(location = ?info.location(), "contained check panic");
                return;
            }
            previous(info);
        }));
    });
}
