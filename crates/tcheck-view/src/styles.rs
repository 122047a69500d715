#![forbid(unsafe_code)]

//! Presentation styles keyed by semantic role.

use tcheck_core::TaskStatus;
use tcheck_render::{PackedRgba, Style, StyleFlags};

/// Style table used by the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStyles {
    /// Pending tasks and the progress bar frame.
    pub default: Style,
    /// Completed tasks.
    pub success: Style,
    /// Failed tasks and the "screen too small" message.
    pub failure: Style,
    /// Tasks in progress.
    pub in_progress: Style,
    pub scrollbar_track: Style,
    pub scrollbar_thumb: Style,
    pub scrollbar_arrow: Style,
    /// Label drawn over the aggregate progress bar, in bold.
    pub progress: Style,
}

impl Default for ViewStyles {
    fn default() -> Self {
        let fg = |color| Style::new().fg(color);
        Self {
            default: fg(PackedRgba::SILVER),
            success: fg(PackedRgba::GREEN),
            failure: fg(PackedRgba::RED),
            in_progress: fg(PackedRgba::YELLOW),
            scrollbar_track: fg(PackedRgba::DARK_GRAY),
            scrollbar_thumb: fg(PackedRgba::SILVER),
            scrollbar_arrow: fg(PackedRgba::SILVER),
            progress: Style::new()
                .fg(PackedRgba::BLACK)
                .bg(PackedRgba::TEAL)
                .flags(StyleFlags::BOLD),
        }
    }
}

impl ViewStyles {
    /// Style of a task line with the given status.
    pub fn for_status(&self, status: TaskStatus) -> Style {
        match status {
            TaskStatus::Pending => self.default,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.success,
            TaskStatus::Failed => self.failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_role() {
        let styles = ViewStyles::default();
        assert_eq!(styles.for_status(TaskStatus::Completed).fg, PackedRgba::GREEN);
        assert_eq!(styles.for_status(TaskStatus::Failed).fg, PackedRgba::RED);
        assert_eq!(styles.for_status(TaskStatus::InProgress).fg, PackedRgba::YELLOW);
        assert_eq!(styles.for_status(TaskStatus::Pending).fg, PackedRgba::SILVER);
        assert_eq!(styles.progress.bg, PackedRgba::TEAL);
        assert!(styles.progress.flags.contains(StyleFlags::BOLD));
        assert!(styles.success.flags.is_empty());
        assert!(styles.default.bg.is_default());
    }
}
