#![forbid(unsafe_code)]

//! Terminal capability traits.
//!
//! The view consumes a terminal through two narrow traits so that any
//! backend, real or headless, is interchangeable:
//!
//! - [`Screen`]: size, cell writes, clear, commit, and resync after resize.
//! - [`EventSource`]: bounded-time polling for the next input or resize.
//!
//! They are separate because the view draws from many threads under its own
//! lock while a single input thread owns the event source.

use std::io;
use std::time::Duration;

use crate::cell::Style;
use crate::event::Event;

/// Drawing surface of a terminal.
///
/// Writes go to a back buffer; nothing is visible until [`Screen::show`].
pub trait Screen: Send {
    /// Current size as `(width, height)` in cells.
    fn size(&self) -> (u16, u16);

    /// Write one character. Out-of-bounds writes are ignored.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style);

    /// Blank the back buffer.
    fn clear(&mut self);

    /// Commit the back buffer to the terminal.
    fn show(&mut self) -> io::Result<()>;

    /// Re-read the terminal size and invalidate whatever is on screen, so the
    /// next [`Screen::show`] repaints everything.
    fn sync(&mut self) -> io::Result<()>;
}

/// Source of input and resize events.
pub trait EventSource: Send {
    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `Ok(None)` on timeout or when the backend read an event with
    /// no canonical representation.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn size(&self) -> (u16, u16) {
        (**self).size()
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        (**self).set_cell(x, y, ch, style)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn show(&mut self) -> io::Result<()> {
        (**self).show()
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }
}

impl<E: EventSource + ?Sized> EventSource for Box<E> {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        (**self).poll_event(timeout)
    }
}
