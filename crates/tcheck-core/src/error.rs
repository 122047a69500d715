#![forbid(unsafe_code)]

//! Failure reasons recorded on tasks.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Boxed error returned by check functions.
///
/// Any `std::error::Error + Send + Sync` converts into it, as does a plain
/// `&str` or `String`, so checks can use `?` or `Err("reason".into())`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a task ended in [`TaskStatus::Failed`](crate::TaskStatus::Failed).
#[derive(Debug, Clone)]
pub enum TaskFailure {
    /// The check function returned an error. Displayed verbatim.
    Check(Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The check function panicked; holds the panic message.
    Panicked(String),
}

impl TaskFailure {
    /// Wrap an error returned by a check function.
    pub fn from_check(err: BoxError) -> Self {
        Self::Check(Arc::from(err))
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked(message)
    }

    /// Returns true if the failure came from a contained panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check(err) => write!(f, "{err}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Check(err) => Some(err.as_ref()),
            Self::Panicked(_) => None,
        }
    }
}

/// Returned by [`Scheduler::set_listener`](crate::Scheduler::set_listener)
/// when a listener is already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerAlreadySet;

impl fmt::Display for ListenerAlreadySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("change listener already installed")
    }
}

impl std::error::Error for ListenerAlreadySet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_failure_displays_verbatim() {
        let failure = TaskFailure::from_check("gateway not reachable".into());
        assert_eq!(failure.to_string(), "gateway not reachable");
        assert!(!failure.is_panic());
    }

    #[test]
    fn panic_payloads_are_extracted() {
        let from_str = TaskFailure::from_panic(Box::new("boom"));
        assert_eq!(from_str.to_string(), "panicked: boom");

        let from_string = TaskFailure::from_panic(Box::new(String::from("index out of range")));
        assert_eq!(from_string.to_string(), "panicked: index out of range");

        let opaque = TaskFailure::from_panic(Box::new(42_u32));
        assert_eq!(opaque.to_string(), "panicked: unknown panic");
        assert!(opaque.is_panic());
    }

    #[test]
    fn source_exposes_check_error() {
        use std::error::Error as _;
        let io = std::io::Error::other("disk full");
        let failure = TaskFailure::from_check(Box::new(io));
        let source = failure.source().expect("check failures carry a source");
        assert_eq!(source.to_string(), "disk full");
    }
}
