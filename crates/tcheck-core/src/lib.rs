#![forbid(unsafe_code)]

//! Core task engine for tcheck.
//!
//! Checks are registered with a [`Scheduler`], which runs them on worker
//! threads with bounded concurrency and tells an optional
//! [`ChangeListener`] whenever something may have changed. Each [`Task`]
//! follows a one-way life cycle and exposes its live state through cheap
//! accessor calls.
//!
//! ```
//! use std::sync::Arc;
//! use tcheck_core::{Scheduler, SchedulerConfig, TaskStatus};
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(2));
//! scheduler.register("config syntax", |reporter| {
//!     reporter.report(50, "parsing");
//!     Ok(())
//! });
//! scheduler.register("disk space", |_| Err("volume full".into()));
//!
//! scheduler.run_all().wait();
//!
//! let tasks = scheduler.snapshot();
//! assert_eq!(tasks[0].status(), TaskStatus::Completed);
//! assert_eq!(tasks[1].error().map(|e| e.to_string()).as_deref(), Some("volume full"));
//! assert_eq!(scheduler.overall_progress().percent, 100);
//! ```

pub mod containment;
pub mod error;
pub mod gate;
pub mod logging;
pub mod scheduler;
pub mod task;

#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};

pub use error::{BoxError, ListenerAlreadySet, TaskFailure};
pub use gate::{Gate, Permit};
pub use scheduler::{
    ChangeListener, DEFAULT_CONCURRENCY, DEFAULT_REFRESH_INTERVAL, OverallProgress, RunHandle,
    Scheduler, SchedulerConfig,
};
pub use task::{CheckFn, Reporter, Task, TaskId, TaskState, TaskStatus};
