#![forbid(unsafe_code)]

//! tcheck public facade crate.
//!
//! Register checks with a [`Scheduler`], hand it to a [`TaskListView`] and
//! call [`run_checks`]: every check runs with bounded parallelism while the
//! view shows live progress until the user quits. Afterwards inspect
//! [`Scheduler::failed`] to decide what to do next.
//!
//! ```no_run
//! use tcheck::prelude::*;
//!
//! fn main() -> tcheck::Result<()> {
//!     let scheduler = Scheduler::new(SchedulerConfig::default().with_concurrency(3));
//!     scheduler.register("Config syntax", |reporter| {
//!         reporter.report(50, "Parsing");
//!         Ok(())
//!     });
//!
//!     let (screen, events) = tcheck::open_terminal(SessionOptions::default())?;
//!     let view = TaskListView::new(screen, scheduler.clone());
//!     tcheck::run_checks(&view, events)?;
//!
//!     for task in scheduler.failed() {
//!         eprintln!("{}: {:?}", task.name(), task.error());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

// --- Core re-exports -------------------------------------------------------

pub use tcheck_core::{
    BoxError, ChangeListener, ListenerAlreadySet, OverallProgress, Reporter, RunHandle, Scheduler,
    SchedulerConfig, Task, TaskFailure, TaskId, TaskState, TaskStatus,
};

// --- Render re-exports -----------------------------------------------------

pub use tcheck_render::{
    Buffer, Cell, Event, EventSource, HeadlessProbe, HeadlessScreen, KeyCode, KeyEvent, Modifiers,
    PackedRgba, Screen, ScriptedEvents, Style, StyleFlags,
};
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub use tcheck_render::crossterm_backend::{CrosstermEvents, CrosstermScreen};
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub use tcheck_render::terminal_session::{SessionOptions, TerminalSession};

// --- View re-exports -------------------------------------------------------

pub use tcheck_view::{QuitSignal, TaskListView, ViewConfig, ViewStyles};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tcheck programs.
#[derive(Debug)]
pub enum Error {
    /// I/O failure during terminal operations.
    Io(std::io::Error),
    /// Terminal setup or wiring error with message.
    Terminal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Terminal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Terminal(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ListenerAlreadySet> for Error {
    fn from(err: ListenerAlreadySet) -> Self {
        Self::Terminal(format!("cannot attach view: {err}"))
    }
}

/// Standard result type for tcheck APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Entry points ---------------------------------------------------------

/// Enter the terminal for a task list view.
///
/// A failure here is fatal for an interactive program: nothing can be shown,
/// so callers should exit before launching any check.
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub fn open_terminal(options: SessionOptions) -> Result<(CrosstermScreen, CrosstermEvents)> {
    tcheck_render::crossterm_backend::open(options)
        .map_err(|err| Error::Terminal(format!("failed to initialize terminal: {err}")))
}

/// Wire `view` to its scheduler, launch every pending check and block in the
/// view until the user quits or [`TaskListView::stop`] is called.
///
/// Checks still running when the view exits are left to finish on their own
/// threads; their state stays readable through the scheduler.
pub fn run_checks<S, E>(view: &Arc<TaskListView<S>>, events: E) -> Result<()>
where
    S: Screen + 'static,
    E: EventSource + 'static,
{
    view.attach()?;
    drop(view.scheduler().run_all());
    view.run(events)?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BoxError, Error, Event, KeyCode, OverallProgress, Reporter, Result, Scheduler,
        SchedulerConfig, TaskListView, TaskStatus, ViewConfig, ViewStyles,
    };
    #[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
    pub use crate::SessionOptions;

    pub use crate::{core, render, view};
}

pub use tcheck_core as core;
pub use tcheck_render as render;
pub use tcheck_view as view;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_and_source() {
        use std::error::Error as _;
        let io = Error::from(std::io::Error::other("tty gone"));
        assert_eq!(io.to_string(), "tty gone");
        assert!(io.source().is_some());

        let attach = Error::from(ListenerAlreadySet);
        assert_eq!(
            attach.to_string(),
            "cannot attach view: change listener already installed"
        );
        assert!(attach.source().is_none());
    }
}
