#![forbid(unsafe_code)]

//! Bounded-concurrency scheduler.
//!
//! The [`Scheduler`] owns an append-only list of [`Task`]s and runs every
//! pending one on its own thread, admitting at most `concurrency` of them
//! through a [`Gate`] at a time.
//!
//! # Notifications
//!
//! An optional [`ChangeListener`] is told whenever task state may have
//! changed:
//! - once after each task execution finishes;
//! - every `refresh_interval` (100 ms by default) while any task is pending
//!   or in progress, so sub-progress becomes visible;
//! - one final time after every task has reached a terminal state.
//!
//! The periodic notification is unconditional; no change detection is done.
//!
//! # Locking
//!
//! The task list has its own lock, separate from each task's lock. Readers
//! copy the list and release it before touching any task, so a listing
//! never waits on a running task, and no two task locks are ever held
//! together.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{BoxError, ListenerAlreadySet};
use crate::gate::Gate;
use crate::task::{Reporter, Task, TaskId, TaskStatus};

/// Default number of tasks allowed to run at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default interval of the periodic refresh notification.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Observer notified when task state may have changed.
///
/// Called from task threads and the refresh thread, possibly concurrently.
/// Implementations must be cheap or hand the work off; they must not block
/// indefinitely.
pub trait ChangeListener: Send + Sync {
    fn notify(&self);
}

impl<F> ChangeListener for F
where
    F: Fn() + Send + Sync,
{
    fn notify(&self) {
        self()
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum number of tasks executing at once. Values below 1 become 1.
    pub concurrency: usize,
    /// Interval of the periodic refresh notification.
    pub refresh_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Aggregate completion of all registered tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverallProgress {
    /// Tasks in `Completed` or `Failed`.
    pub done: usize,
    /// Tasks registered.
    pub total: usize,
    /// `done * 100 / total`, truncated; 0 when nothing is registered.
    pub percent: usize,
}

impl OverallProgress {
    pub fn from_counts(done: usize, total: usize) -> Self {
        if total == 0 {
            return Self::default();
        }
        Self {
            done,
            total,
            percent: done * 100 / total,
        }
    }

    /// Returns true when every registered task is terminal.
    pub fn is_finished(&self) -> bool {
        self.done == self.total
    }
}

#[derive(Default)]
struct TaskList {
    tasks: Vec<Arc<Task>>,
    next_id: TaskId,
}

struct Shared {
    list: RwLock<TaskList>,
    gate: Gate,
    listener: OnceLock<Arc<dyn ChangeListener>>,
    refresh_interval: Duration,
    refresher_active: AtomicBool,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, TaskList> {
        self.list.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskList> {
        self.list.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<Arc<Task>> {
        self.read().tasks.clone()
    }

    fn notify(&self) {
        if let Some(listener) = self.listener.get() {
            listener.notify();
        }
    }

    fn all_terminal(&self) -> bool {
        self.snapshot()
            .iter()
            .all(|task| task.status().is_terminal())
    }

    fn execute(&self, task: &Arc<Task>) {
        let permit = self.gate.acquire();
        crate::trace!(task_id = task.id(), "admitted through gate");
        task.run();
        drop(permit);
        self.notify();
    }

    fn refresh_loop(&self) {
        crate::debug!("refresh loop started");
        loop {
            let all_done = self.all_terminal();
            self.notify();
            if all_done {
                self.notify();
                self.refresher_active.store(false, Ordering::Release);
                // A launch may have raced with the final check; keep going if
                // it registered work and nobody else picked up refreshing.
                if self.all_terminal() || !self.claim_refresher() {
                    break;
                }
                continue;
            }
            thread::sleep(self.refresh_interval);
        }
        crate::debug!("refresh loop stopped");
    }

    fn claim_refresher(&self) -> bool {
        self.refresher_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Owns the registered tasks and executes them with bounded parallelism.
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// Create a scheduler without a listener.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                list: RwLock::new(TaskList {
                    tasks: Vec::new(),
                    next_id: 1,
                }),
                gate: Gate::new(config.concurrency),
                listener: OnceLock::new(),
                refresh_interval: config.refresh_interval,
                refresher_active: AtomicBool::new(false),
            }),
        }
    }

    /// Create a scheduler that notifies `listener` on change.
    pub fn with_listener(config: SchedulerConfig, listener: Arc<dyn ChangeListener>) -> Self {
        let scheduler = Self::new(config);
        let _ = scheduler.shared.listener.set(listener);
        scheduler
    }

    /// Install the listener after construction.
    ///
    /// Exists for observers that need the scheduler before they can be
    /// built, such as a view. Only one listener can ever be installed.
    pub fn set_listener(&self, listener: Arc<dyn ChangeListener>) -> Result<(), ListenerAlreadySet> {
        self.shared.listener.set(listener).map_err(|_| ListenerAlreadySet)
    }

    /// Maximum number of tasks executing at once.
    pub fn concurrency_limit(&self) -> usize {
        self.shared.gate.capacity()
    }

    /// Register a new pending task and return its id.
    pub fn register(
        &self,
        name: impl Into<String>,
        check: impl FnOnce(Reporter) -> Result<(), BoxError> + Send + 'static,
    ) -> TaskId {
        let name = name.into();
        let mut list = self.shared.write();
        let id = list.next_id;
        list.next_id += 1;
        crate::debug!(task_id = id, name = %name, "task registered");
        list.tasks.push(Arc::new(Task::new(id, name, check)));
        id
    }

    /// Copy of the ordered task list. The tasks themselves are shared, so
    /// their live status stays observable through the copy.
    pub fn snapshot(&self) -> Vec<Arc<Task>> {
        self.shared.snapshot()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.shared.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Launch every task that is pending right now.
    ///
    /// Each task gets its own thread which waits for a gate slot, runs the
    /// task, releases the slot and notifies the listener. Tasks registered
    /// after this call are not picked up by it. Returns without waiting for
    /// any task to finish.
    pub fn run_all(&self) -> RunHandle {
        let pending: Vec<Arc<Task>> = self
            .snapshot()
            .into_iter()
            .filter(|task| task.try_claim())
            .collect();
        crate::debug!(count = pending.len(), "launching pending tasks");

        let mut threads = Vec::with_capacity(pending.len());
        for task in pending {
            let shared = Arc::clone(&self.shared);
            let worker = Arc::clone(&task);
            let spawned = thread::Builder::new()
                .name(format!("tcheck-task-{}", task.id()))
                .spawn(move || shared.execute(&worker));
            match spawned {
                Ok(handle) => threads.push(handle),
                Err(_err) => {
                    crate::error!(task_id = task.id(), error = %_err, "failed to spawn task thread");
                    task.release_claim();
                }
            }
        }

        if self.shared.claim_refresher() {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name("tcheck-refresh".into())
                .spawn(move || shared.refresh_loop());
            if spawned.is_err() {
                crate::error!("failed to spawn refresh thread");
                self.shared.refresher_active.store(false, Ordering::Release);
            }
        }

        RunHandle { threads }
    }

    /// Aggregate progress over all registered tasks.
    pub fn overall_progress(&self) -> OverallProgress {
        let tasks = self.snapshot();
        let done = tasks
            .iter()
            .filter(|task| task.status().is_terminal())
            .count();
        OverallProgress::from_counts(done, tasks.len())
    }

    /// Tasks that ended in `Failed`, in registration order.
    pub fn failed(&self) -> Vec<Arc<Task>> {
        self.snapshot()
            .into_iter()
            .filter(|task| task.status() == TaskStatus::Failed)
            .collect()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.len())
            .field("concurrency", &self.concurrency_limit())
            .field("refresh_interval", &self.shared.refresh_interval)
            .finish()
    }
}

/// Threads launched by one [`Scheduler::run_all`] call.
///
/// Dropping the handle detaches the threads; the tasks keep running.
#[derive(Debug)]
#[must_use = "drop the handle to detach, or call wait() to block until done"]
pub struct RunHandle {
    threads: Vec<JoinHandle<()>>,
}

impl RunHandle {
    /// Number of tasks this call launched.
    pub fn launched(&self) -> usize {
        self.threads.len()
    }

    /// Block until every launched task has finished.
    pub fn wait(self) {
        for handle in self.threads {
            let _ = handle.join();
        }
    }
}
