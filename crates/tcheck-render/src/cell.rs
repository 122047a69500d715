#![forbid(unsafe_code)]

//! Colors, styles and grid cells.
//!
//! A [`Cell`] is one terminal column of one row: a character plus the
//! [`Style`] it is drawn with. Colors are packed RGBA; an alpha of zero
//! means "use the terminal's default color" rather than a concrete value.

/// A 32-bit packed RGBA color (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// The terminal's default color.
    pub const TRANSPARENT: Self = Self(0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const SILVER: Self = Self::rgb(192, 192, 192);
    pub const DARK_GRAY: Self = Self::rgb(169, 169, 169);
    pub const TEAL: Self = Self::rgb(0, 128, 128);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Returns true for the terminal default color.
    #[inline]
    pub const fn is_default(self) -> bool {
        self.a() == 0
    }
}

bitflags::bitflags! {
    /// Cell text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD = 0b0000_0001;
    }
}

/// Foreground, background and attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: PackedRgba,
    pub bg: PackedRgba,
    pub flags: StyleFlags,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const fn new() -> Self {
        Self {
            fg: PackedRgba::TRANSPARENT,
            bg: PackedRgba::TRANSPARENT,
            flags: StyleFlags::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = color;
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = color;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: StyleFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A space in the default style.
    pub const BLANK: Self = Self {
        ch: ' ',
        style: Style::new(),
    };

    #[inline]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// Display width of the cell's character in columns (0, 1 or 2).
    pub fn width(&self) -> usize {
        unicode_width::UnicodeWidthChar::width(self.ch).unwrap_or(0)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}
