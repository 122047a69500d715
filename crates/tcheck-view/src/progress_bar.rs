#![forbid(unsafe_code)]

//! Aggregate progress bar on the bottom row.

use tcheck_core::OverallProgress;
use tcheck_render::Screen;

use crate::status_line::emit_str;
use crate::styles::ViewStyles;

/// `[====      ]` spanning `width` columns, filled to `percent`.
pub fn bar_text(width: u16, percent: usize) -> String {
    let inner = usize::from(width).saturating_sub(2);
    let filled = inner * percent.min(100) / 100;
    let mut bar = String::with_capacity(inner + 2);
    bar.push('[');
    bar.extend(std::iter::repeat_n('=', filled));
    bar.extend(std::iter::repeat_n(' ', inner - filled));
    bar.push(']');
    bar
}

/// Centered label text.
pub fn label(progress: &OverallProgress) -> String {
    format!(
        "Overall Progress: {}/{} ({}%)",
        progress.done, progress.total, progress.percent
    )
}

/// Clear row `y`, draw the bar in the default style and the label centered
/// over it in the progress style.
pub fn draw<S: Screen + ?Sized>(screen: &mut S, y: u16, width: u16, progress: &OverallProgress, styles: &ViewStyles) {
    for x in 0..width {
        screen.set_cell(x, y, ' ', styles.default);
    }
    emit_str(screen, 0, y, styles.default, &bar_text(width, progress.percent));

    let label = label(progress);
    let x = usize::from(width).saturating_sub(label.len()) / 2;
    emit_str(screen, x as u16, y, styles.progress, &label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcheck_render::{HeadlessScreen, PackedRgba, StyleFlags};

    #[test]
    fn bar_fill_is_floored() {
        assert_eq!(bar_text(12, 0), "[          ]");
        assert_eq!(bar_text(12, 33), "[===       ]");
        assert_eq!(bar_text(12, 100), "[==========]");
        assert_eq!(bar_text(1, 50), "[]");
    }

    #[test]
    fn label_is_centered_in_progress_style() {
        let mut screen = HeadlessScreen::new(40, 1);
        let styles = ViewStyles::default();
        let progress = OverallProgress::from_counts(1, 3);
        draw(&mut screen, 0, 40, &progress, &styles);

        let text = screen.buffer().row_text(0);
        let label = "Overall Progress: 1/3 (33%)";
        let start = (40 - label.len()) / 2;
        assert_eq!(&text[start..start + label.len()], label);
        assert!(text.starts_with("[====="));
        assert!(text.ends_with(']'));
        let cell = screen.buffer().get(start as u16, 0).unwrap();
        assert_eq!(cell.style.bg, PackedRgba::TEAL);
        assert!(cell.style.flags.contains(StyleFlags::BOLD));
        let frame = screen.buffer().get(0, 0).unwrap();
        assert_eq!(frame.style.fg, PackedRgba::SILVER);
    }

    #[test]
    fn narrow_screen_clips_label() {
        let mut screen = HeadlessScreen::new(10, 1);
        let styles = ViewStyles::default();
        draw(&mut screen, 0, 10, &OverallProgress::from_counts(0, 0), &styles);
        assert_eq!(screen.buffer().row_text(0), "Overall Pr");
    }
}
