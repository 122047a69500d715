#![forbid(unsafe_code)]

//! Render kernel for tcheck: styled cells, a grid buffer, canonical input
//! events, the terminal capability traits the view draws through, and two
//! backends: headless, and crossterm behind the `crossterm` feature.

pub mod buffer;
pub mod cell;
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub mod crossterm_backend;
pub mod event;
pub mod headless;
pub mod screen;
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
pub mod terminal_session;

pub use buffer::Buffer;
pub use cell::{Cell, PackedRgba, Style, StyleFlags};
pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use headless::{EventFeeder, HeadlessProbe, HeadlessScreen, ScriptedEvents};
pub use screen::{EventSource, Screen};
