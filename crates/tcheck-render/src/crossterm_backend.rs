#![forbid(unsafe_code)]

//! Crossterm-backed terminal.
//!
//! [`open`] starts a [`TerminalSession`] and returns the drawing half
//! ([`CrosstermScreen`]) and the input half ([`CrosstermEvents`]). The screen
//! owns the session, so dropping it restores the terminal.
//!
//! Every `show()` repaints the whole grid. The task list is small and
//! redraws at most a few times per interval, so no diffing is done.

use std::io::{self, BufWriter, Stdout, Write};
use std::time::Duration;

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::buffer::Buffer;
use crate::cell::{Cell, PackedRgba, Style, StyleFlags};
use crate::event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers};
use crate::screen::{EventSource, Screen};
use crate::terminal_session::{SessionOptions, TerminalSession};

/// Enter the terminal and split it into a screen and an event source.
///
/// # Errors
///
/// Fails when stdout is not a terminal or raw mode cannot be enabled. No
/// terminal state is left changed in that case.
pub fn open(options: SessionOptions) -> io::Result<(CrosstermScreen, CrosstermEvents)> {
    let session = TerminalSession::new(options)?;
    let (width, height) = session.size()?;
    let mut screen = CrosstermScreen {
        back: Buffer::new(width, height),
        out: BufWriter::new(io::stdout()),
        session,
    };
    queue!(screen.out, terminal::Clear(terminal::ClearType::All))?;
    screen.out.flush()?;
    Ok((screen, CrosstermEvents { _private: () }))
}

/// Drawing half of a crossterm terminal.
#[derive(Debug)]
pub struct CrosstermScreen {
    back: Buffer,
    out: BufWriter<Stdout>,
    // Declared last so it drops after the writer is flushed.
    session: TerminalSession,
}

impl CrosstermScreen {
    fn repaint(&mut self) -> io::Result<()> {
        let mut current: Option<Style> = None;
        for y in 0..self.back.height() {
            queue!(self.out, cursor::MoveTo(0, y))?;
            let mut skip = 0;
            for cell in self.back.row_cells(y) {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                if current != Some(cell.style) {
                    apply_style(&mut self.out, cell.style)?;
                    current = Some(cell.style);
                }
                queue!(self.out, Print(printable(cell)))?;
                skip = cell.width().saturating_sub(1);
            }
        }
        queue!(self.out, SetAttribute(Attribute::Reset))?;
        self.out.flush()
    }
}

impl Screen for CrosstermScreen {
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
        self.repaint()
    }

    fn sync(&mut self) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        if (width, height) != self.size() {
            self.back.resize(width, height);
        }
        queue!(self.out, terminal::Clear(terminal::ClearType::All))?;
        self.out.flush()
    }
}

impl Drop for CrosstermScreen {
    fn drop(&mut self) {
        let _ = queue!(self.out, SetAttribute(Attribute::Reset));
        let _ = self.out.flush();
    }
}

/// Input half of a crossterm terminal.
///
/// Crossterm reads from a process-wide queue; this type only marks the
/// single owner of that queue.
#[derive(Debug)]
pub struct CrosstermEvents {
    _private: (),
}

impl EventSource for CrosstermEvents {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        Ok(map_crossterm_event(crossterm::event::read()?))
    }
}

fn printable(cell: &Cell) -> char {
    if cell.ch.is_control() { ' ' } else { cell.ch }
}

fn apply_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(map_color(style.fg)),
        SetBackgroundColor(map_color(style.bg))
    )?;
    if style.flags.contains(StyleFlags::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    Ok(())
}

fn map_color(color: PackedRgba) -> Color {
    if color.is_default() {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r(),
            g: color.g(),
            b: color.b(),
        }
    }
}

fn map_crossterm_event(event: crossterm::event::Event) -> Option<Event> {
    match event {
        crossterm::event::Event::Key(key) => map_key_event(key).map(Event::Key),
        crossterm::event::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        _ => None,
    }
}

fn map_key_event(event: crossterm::event::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind: map_key_kind(event.kind),
    })
}

fn map_key_kind(kind: crossterm::event::KeyEventKind) -> KeyEventKind {
    match kind {
        crossterm::event::KeyEventKind::Press => KeyEventKind::Press,
        crossterm::event::KeyEventKind::Repeat => KeyEventKind::Repeat,
        crossterm::event::KeyEventKind::Release => KeyEventKind::Release,
    }
}

fn map_key_code(code: crossterm::event::KeyCode) -> Option<KeyCode> {
    match code {
        crossterm::event::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        crossterm::event::KeyCode::Enter => Some(KeyCode::Enter),
        crossterm::event::KeyCode::Esc => Some(KeyCode::Escape),
        crossterm::event::KeyCode::Up => Some(KeyCode::Up),
        crossterm::event::KeyCode::Down => Some(KeyCode::Down),
        crossterm::event::KeyCode::Left => Some(KeyCode::Left),
        crossterm::event::KeyCode::Right => Some(KeyCode::Right),
        crossterm::event::KeyCode::PageUp => Some(KeyCode::PageUp),
        crossterm::event::KeyCode::PageDown => Some(KeyCode::PageDown),
        crossterm::event::KeyCode::Home => Some(KeyCode::Home),
        crossterm::event::KeyCode::End => Some(KeyCode::End),
        crossterm::event::KeyCode::Tab => Some(KeyCode::Tab),
        crossterm::event::KeyCode::Backspace => Some(KeyCode::Backspace),
        _ => None,
    }
}

fn map_modifiers(modifiers: crossterm::event::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(crossterm::event::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(crossterm::event::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(crossterm::event::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(crossterm::event::KeyModifiers::SUPER)
        || modifiers.contains(crossterm::event::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}
