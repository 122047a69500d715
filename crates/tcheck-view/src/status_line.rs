#![forbid(unsafe_code)]

//! One-line rendering of a task and width-aware text emission.

use tcheck_core::{TaskState, TaskStatus};
use tcheck_render::{Screen, Style};
use unicode_width::UnicodeWidthChar;

pub const GLYPH_COMPLETED: &str = "✅";
pub const GLYPH_FAILED: &str = "❌";
pub const GLYPH_IN_PROGRESS: &str = "⏳";
pub const GLYPH_PENDING: &str = "-";

/// Text of the list line for a task.
///
/// ```
/// use tcheck_core::{TaskState, TaskStatus};
/// use tcheck_view::status_line::format_line;
///
/// let state = TaskState {
///     status: TaskStatus::InProgress,
///     sub_progress: 40,
///     sub_message: "Checking DNS".into(),
///     error: None,
/// };
/// assert_eq!(format_line("Network", &state), "⏳ Network (40% - Checking DNS)");
/// ```
pub fn format_line(name: &str, state: &TaskState) -> String {
    match state.status {
        TaskStatus::Completed => format!("{GLYPH_COMPLETED} {name}"),
        TaskStatus::Failed => match &state.error {
            Some(err) => format!("{GLYPH_FAILED} {name} ({err})"),
            None => format!("{GLYPH_FAILED} {name}"),
        },
        TaskStatus::InProgress => {
            if state.sub_message.is_empty() {
                format!("{GLYPH_IN_PROGRESS} {name} ({}%)", state.sub_progress)
            } else {
                format!(
                    "{GLYPH_IN_PROGRESS} {name} ({}% - {})",
                    state.sub_progress, state.sub_message
                )
            }
        }
        TaskStatus::Pending => format!("{GLYPH_PENDING} {name}"),
    }
}

/// Draw `text` starting at `(x, y)` and return the column after it.
///
/// Wide characters advance two columns; the second column is left as is.
/// Zero-width characters are skipped. Drawing stops before the first
/// character that does not fit entirely, so a wide glyph never straddles the
/// right edge.
pub fn emit_str<S: Screen + ?Sized>(screen: &mut S, x: u16, y: u16, style: Style, text: &str) -> u16 {
    let (width, _) = screen.size();
    let mut col = x;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0) as u16;
        if w == 0 {
            continue;
        }
        if u32::from(col) + u32::from(w) > u32::from(width) {
            break;
        }
        screen.set_cell(col, y, ch, style);
        col += w;
    }
    col
}
