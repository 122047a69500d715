#![forbid(unsafe_code)]

//! Terminal view for tcheck.
//!
//! Renders a [`Scheduler`](tcheck_core::Scheduler)'s tasks as a scrollable
//! status list with an aggregate progress bar, and turns keyboard and resize
//! input into scrolling and quit. Any [`Screen`](tcheck_render::Screen) /
//! [`EventSource`](tcheck_render::EventSource) pair can drive it.

pub mod progress_bar;
pub mod quit;
pub mod scrollbar;
pub mod status_line;
pub mod styles;
pub mod view;

pub use quit::QuitSignal;
pub use styles::ViewStyles;
pub use view::{Flow, MIN_HEIGHT, TOO_SMALL_MESSAGE, TaskListView, ViewConfig};
