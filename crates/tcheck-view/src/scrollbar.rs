#![forbid(unsafe_code)]

//! Vertical scrollbar and overflow arrows for the task list.
//!
//! The list occupies rows `0..rows` (the last terminal row belongs to the
//! aggregate bar). The rightmost column holds:
//!
//! ```text
//! row 0          ▲   (when scrolled down)
//! rows 1..rows-1 │ track with █ thumb
//! row rows-1     ▼   (when more tasks below)
//! ```

use tcheck_render::Screen;

use crate::status_line::emit_str;
use crate::styles::ViewStyles;

pub const TRACK: &str = "│";
pub const THUMB: &str = "█";
pub const ARROW_UP: &str = "▲";
pub const ARROW_DOWN: &str = "▼";

/// Scrollbar geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    /// Visible list rows.
    pub rows: usize,
    /// Track length between the arrow rows.
    pub track: usize,
    /// Thumb length, at least 1.
    pub thumb_size: usize,
    /// Thumb offset from the top of the track.
    pub thumb_offset: usize,
    pub more_above: bool,
    pub more_below: bool,
}

impl ScrollMetrics {
    /// Geometry for `num_tasks` tasks shown in `rows` rows starting at
    /// `scroll_top`, or `None` when everything fits.
    pub fn compute(num_tasks: usize, rows: usize, scroll_top: usize) -> Option<Self> {
        if num_tasks <= rows {
            return None;
        }
        let track = rows.saturating_sub(2);
        let thumb_size = (track * rows / num_tasks).max(1);
        let max_scroll = num_tasks - rows;
        let thumb_offset = track.saturating_sub(thumb_size) * scroll_top.min(max_scroll) / max_scroll;
        Some(Self {
            rows,
            track,
            thumb_size,
            thumb_offset,
            more_above: scroll_top > 0,
            more_below: scroll_top + rows < num_tasks,
        })
    }

    /// List rows covered by the thumb, clipped to the track.
    pub fn thumb_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.thumb_size)
            .map(|i| self.thumb_offset + i + 1)
            .filter(|row| *row < self.rows.saturating_sub(1))
    }
}

/// Draw the arrows, then the track and thumb, in the column `width - 1`.
pub fn draw<S: Screen + ?Sized>(screen: &mut S, width: u16, metrics: &ScrollMetrics, styles: &ViewStyles) {
    let Some(x) = width.checked_sub(1) else {
        return;
    };
    let last = metrics.rows.saturating_sub(1) as u16;

    if metrics.more_above {
        emit_str(screen, x, 0, styles.scrollbar_arrow, ARROW_UP);
    }
    if metrics.more_below {
        emit_str(screen, x, last, styles.scrollbar_arrow, ARROW_DOWN);
    }

    for row in 1..last {
        emit_str(screen, x, row, styles.scrollbar_track, TRACK);
    }
    for row in metrics.thumb_rows() {
        emit_str(screen, x, row as u16, styles.scrollbar_thumb, THUMB);
    }
}
