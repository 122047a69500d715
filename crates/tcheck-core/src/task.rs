#![forbid(unsafe_code)]

//! Task state machine.
//!
//! A [`Task`] moves through `Pending -> InProgress -> Completed | Failed` and
//! never leaves a terminal state. [`Task::run`] is the only transition
//! trigger. While the check function executes it holds a [`Reporter`] that
//! can update the task's sub-progress; once the task is finalized every
//! further report is ignored.
//!
//! # Invariants
//!
//! 1. All mutable fields live behind one mutex per task.
//! 2. No check code ever runs while that mutex is held.
//! 3. `sub_progress` is always within `0..=100`.
//! 4. `error` is `Some` exactly when `status == Failed`.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::containment;
use crate::error::{BoxError, TaskFailure};

/// Identifier assigned by the scheduler, starting at 1.
pub type TaskId = u64;

/// Caller-supplied check logic.
pub type CheckFn = Box<dyn FnOnce(Reporter) -> Result<(), BoxError> + Send + 'static>;

/// Life-cycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    /// Registered, not started yet.
    #[default]
    Pending,
    /// The check function is executing.
    InProgress,
    /// The check function returned success.
    Completed,
    /// The check function returned an error or panicked.
    Failed,
}

impl TaskStatus {
    /// Returns true for `Completed` and `Failed`.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Short human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A consistent copy of a task's mutable fields, read under one lock.
#[derive(Debug, Clone, Default)]
pub struct TaskState {
    pub status: TaskStatus,
    /// Percentage in `0..=100`.
    pub sub_progress: u8,
    /// Last message passed to [`Reporter::report`].
    pub sub_message: String,
    /// Failure reason, present only when `status == Failed`.
    pub error: Option<TaskFailure>,
}

struct Inner {
    state: TaskState,
    reporting_enabled: bool,
    /// Set once a scheduler has launched this task, so overlapping launches
    /// never pick the same pending task twice.
    claimed: bool,
    check: Option<CheckFn>,
}

/// A single check with its live status.
pub struct Task {
    id: TaskId,
    name: String,
    inner: Mutex<Inner>,
}

impl Task {
    /// Create a pending task.
    pub fn new(
        id: TaskId,
        name: impl Into<String>,
        check: impl FnOnce(Reporter) -> Result<(), BoxError> + Send + 'static,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            inner: Mutex::new(Inner {
                state: TaskState::default(),
                reporting_enabled: false,
                claimed: false,
                check: Some(Box::new(check)),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TaskStatus {
        self.lock().state.status
    }

    pub fn sub_progress(&self) -> u8 {
        self.lock().state.sub_progress
    }

    pub fn sub_message(&self) -> String {
        self.lock().state.sub_message.clone()
    }

    /// Failure reason, if the task failed.
    pub fn error(&self) -> Option<TaskFailure> {
        self.lock().state.error.clone()
    }

    /// Copy all mutable fields at once.
    pub fn state(&self) -> TaskState {
        self.lock().state.clone()
    }

    /// Execute the check function and record its outcome.
    ///
    /// Returns `false` without doing anything if the task is not `Pending`
    /// (it already ran or is running). A panic inside the check function is
    /// caught here and recorded as [`TaskFailure::Panicked`]; it is kept off
    /// stderr (see [`containment`](crate::containment)).
    pub fn run(self: &Arc<Self>) -> bool {
        let check = {
            let mut inner = self.lock();
            if inner.state.status != TaskStatus::Pending {
                return false;
            }
            let Some(check) = inner.check.take() else {
                return false;
            };
            inner.state = TaskState {
                status: TaskStatus::InProgress,
                ..TaskState::default()
            };
            inner.reporting_enabled = true;
            check
        };

        let _span = crate::debug_span!("task_run", task_id = self.id, name = %self.name).entered();
        crate::debug!(task_id = self.id, "task started");
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let started = Instant::now();

        let reporter = Reporter {
            task: Arc::clone(self),
        };
        let failure = {
            let _quiet = containment::enter();
            match catch_unwind(AssertUnwindSafe(move || check(reporter))) {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(TaskFailure::from_check(err)),
                Err(payload) => {
                    let failure = TaskFailure::from_panic(payload);
                    crate::warn!(task_id = self.id, reason = %failure, "check panicked");
                    Some(failure)
                }
            }
        };

        let mut inner = self.lock();
        inner.reporting_enabled = false;
        match failure {
            Some(failure) => {
                inner.state.status = TaskStatus::Failed;
                inner.state.error = Some(failure);
            }
            None => {
                inner.state.status = TaskStatus::Completed;
                inner.state.sub_progress = 100;
            }
        }
        crate::info!(
            task_id = self.id,
            status = %inner.state.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "task finished"
        );
        true
    }

    /// Mark the task as launched. Returns false if it is not pending or has
    /// already been claimed.
    pub(crate) fn try_claim(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.status != TaskStatus::Pending || inner.claimed {
            return false;
        }
        inner.claimed = true;
        true
    }

    /// Undo [`Task::try_claim`] when the launch itself failed.
    pub(crate) fn release_claim(&self) {
        self.lock().claimed = false;
    }

    fn report(&self, percentage: i32, message: String) {
        let mut inner = self.lock();
        if inner.state.status == TaskStatus::InProgress && inner.reporting_enabled {
            inner.state.sub_progress = percentage.clamp(0, 100) as u8;
            inner.state.sub_message = message;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Progress-reporting capability handed to a running check.
///
/// Cloneable and `Send`, so a check may report from threads it spawns.
/// Reports made after the task finished are silently dropped.
#[derive(Clone)]
pub struct Reporter {
    task: Arc<Task>,
}

impl Reporter {
    /// Record sub-progress. `percentage` is clamped to `0..=100`.
    pub fn report(&self, percentage: i32, message: impl Into<String>) {
        self.task.report(percentage, message.into());
    }

    /// Id of the task this reporter is bound to.
    pub fn task_id(&self) -> TaskId {
        self.task.id
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("task_id", &self.task.id)
            .finish()
    }
}
