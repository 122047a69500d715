#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! Backends translate their native events into these types so the view
//! never depends on a particular terminal library. Only the events the
//! task list reacts to are represented; everything else is dropped by the
//! backend.

use bitflags::bitflags;

/// An input or terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press, repeat or release.
    Key(KeyEvent),
    /// The terminal was resized to the given size in cells.
    Resize { width: u16, height: u16 },
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain key press without modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns true if this is `Ctrl+<c>` (case-insensitive).
    pub fn is_ctrl(&self, c: char) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
            && matches!(self.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
    }

    /// Returns true if this is the plain character `c` without Ctrl or Alt.
    pub fn is_char(&self, c: char) -> bool {
        !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
            && self.code == KeyCode::Char(c)
    }
}

/// Key codes the view distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    Backspace,
}

/// Whether a key went down, auto-repeated or went up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<KeyCode> for Event {
    fn from(code: KeyCode) -> Self {
        Event::Key(KeyEvent::new(code))
    }
}
