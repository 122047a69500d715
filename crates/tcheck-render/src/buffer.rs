#![forbid(unsafe_code)]

//! Buffer grid storage.
//!
//! Cells are stored in row-major order: `index = y * width + x`, and
//! `cells.len() == width * height` always holds. Writes outside the grid are
//! ignored, so drawing code never has to pre-clip.
//!
//! A wide character (display width 2) occupies its own cell; the cell to its
//! right is a continuation column that presenters skip.

use crate::cell::Cell;

/// A 2D grid of terminal cells.
///
/// ```
/// use tcheck_render::buffer::Buffer;
/// use tcheck_render::cell::{Cell, Style};
///
/// let mut buffer = Buffer::new(8, 2);
/// buffer.set(0, 0, Cell::new('o', Style::new()));
/// buffer.set(1, 0, Cell::new('k', Style::new()));
/// assert_eq!(buffer.row_text(0), "ok");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// Create a blank buffer. Zero dimensions are allowed and yield an empty
    /// grid.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Set a cell; out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Reallocate to new dimensions. Content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells of row `y`, or an empty slice past the bottom edge.
    pub fn row_cells(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = usize::from(y) * usize::from(self.width);
        &self.cells[start..start + usize::from(self.width)]
    }

    /// Visible text of row `y` with trailing blanks trimmed.
    ///
    /// Continuation columns after wide characters are skipped, so the result
    /// reads the way the terminal shows it.
    pub fn row_text(&self, y: u16) -> String {
        let mut out = String::new();
        let mut skip = 0;
        for cell in self.row_cells(y) {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            out.push(cell.ch);
            skip = cell.width().saturating_sub(1);
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// All rows as text, joined with newlines.
    pub fn to_text(&self) -> String {
        (0..self.height)
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
