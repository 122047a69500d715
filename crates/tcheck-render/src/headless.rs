#![forbid(unsafe_code)]

//! In-memory backend for tests and non-interactive runs.
//!
//! [`HeadlessScreen`] draws into a [`Buffer`] and, on `show()`, publishes a
//! copy that a [`HeadlessProbe`] can inspect from another thread while the
//! screen itself is owned by a view. [`ScriptedEvents`] replays events sent
//! through an [`EventFeeder`].

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::buffer::Buffer;
use crate::cell::{Cell, Style};
use crate::event::Event;
use crate::screen::{EventSource, Screen};

#[derive(Debug)]
struct Published {
    frame: Buffer,
    terminal_size: (u16, u16),
    shows: usize,
    syncs: usize,
    dropped: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<Published>,
    presented: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Published> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A screen that renders to memory.
#[derive(Debug)]
pub struct HeadlessScreen {
    back: Buffer,
    shared: Arc<Shared>,
}

impl HeadlessScreen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            back: Buffer::new(width, height),
            shared: Arc::new(Shared {
                state: Mutex::new(Published {
                    frame: Buffer::new(width, height),
                    terminal_size: (width, height),
                    shows: 0,
                    syncs: 0,
                    dropped: false,
                }),
                presented: Condvar::new(),
            }),
        }
    }

    /// A handle for observing this screen after it has been handed off.
    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The back buffer as drawn so far.
    pub fn buffer(&self) -> &Buffer {
        &self.back
    }
}

impl Screen for HeadlessScreen {
    fn size(&self) -> (u16, u16) {
        (self.back.width(), self.back.height())
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.back.set(x, y, Cell::new(ch, style));
    }

    fn clear(&mut self) {
        self.back.clear();
    }

    fn show(&mut self) -> io::Result<()> {
        let mut state = self.shared.lock();
        state.frame = self.back.clone();
        state.shows += 1;
        self.shared.presented.notify_all();
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        let mut state = self.shared.lock();
        let (width, height) = state.terminal_size;
        if (width, height) != self.size() {
            self.back.resize(width, height);
        }
        state.syncs += 1;
        Ok(())
    }
}

impl Drop for HeadlessScreen {
    fn drop(&mut self) {
        self.shared.lock().dropped = true;
        self.shared.presented.notify_all();
    }
}

/// Read side of a [`HeadlessScreen`].
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    shared: Arc<Shared>,
}

impl HeadlessProbe {
    /// Copy of the last committed frame.
    pub fn frame(&self) -> Buffer {
        self.shared.lock().frame.clone()
    }

    /// Text of row `y` of the last committed frame.
    pub fn row_text(&self, y: u16) -> String {
        self.shared.lock().frame.row_text(y)
    }

    /// The whole last committed frame as text.
    pub fn text(&self) -> String {
        self.shared.lock().frame.to_text()
    }

    /// Number of `show()` calls so far.
    pub fn shows(&self) -> usize {
        self.shared.lock().shows
    }

    /// Number of `sync()` calls so far.
    pub fn syncs(&self) -> usize {
        self.shared.lock().syncs
    }

    /// Returns true once the screen has been dropped (released by its owner).
    pub fn is_released(&self) -> bool {
        self.shared.lock().dropped
    }

    /// Change the simulated terminal size. Takes effect on the next
    /// `sync()`, as a real terminal does.
    pub fn resize(&self, width: u16, height: u16) {
        self.shared.lock().terminal_size = (width, height);
    }

    /// Block until at least `count` frames have been shown or `timeout`
    /// elapses. Returns true if the count was reached.
    pub fn wait_for_shows(&self, count: usize, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.shows >= count)
    }

    /// Block until a shown frame satisfies `pred` or `timeout` elapses.
    pub fn wait_for_frame(&self, timeout: Duration, mut pred: impl FnMut(&Buffer) -> bool) -> bool {
        self.wait_until(timeout, |state| pred(&state.frame))
    }

    /// Block until the screen is dropped or `timeout` elapses.
    pub fn wait_for_release(&self, timeout: Duration) -> bool {
        self.wait_until(timeout, |state| state.dropped)
    }

    fn wait_until(&self, timeout: Duration, mut done: impl FnMut(&Published) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            if done(&state) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .shared
                .presented
                .wait_timeout(state, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}

/// Event source replaying events pushed through an [`EventFeeder`].
#[derive(Debug)]
pub struct ScriptedEvents {
    rx: Receiver<Event>,
}

/// Sending half of a [`ScriptedEvents`] source.
#[derive(Debug, Clone)]
pub struct EventFeeder {
    tx: Sender<Event>,
}

impl ScriptedEvents {
    /// Create a connected feeder and source.
    pub fn channel() -> (EventFeeder, Self) {
        let (tx, rx) = mpsc::channel();
        (EventFeeder { tx }, Self { rx })
    }

    /// A source that yields `events` in order, then only timeouts.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let (feeder, source) = Self::channel();
        for event in events {
            feeder.send(event);
        }
        source
    }
}

impl EventFeeder {
    /// Queue an event. Events sent after the source is gone are dropped.
    pub fn send(&self, event: impl Into<Event>) {
        let _ = self.tx.send(event.into());
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                // No more input can arrive; behave like an idle terminal.
                thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}
