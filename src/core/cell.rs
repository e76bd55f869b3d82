//! # Cells and Colors
//!
//! A [`Cell`] is one character position in the virtual grid: a symbol plus
//! foreground/background colors. [`Color`] is either a concrete 24-bit RGB
//! value or the `Default` sentinel, which means "whatever the terminal's own
//! default is". The sentinel is an explicit variant so it can never be
//! confused with a real RGB value such as black.

use std::fmt;

/// A terminal color: a 24-bit RGB value or the terminal's own default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Color {
    /// Render with the backend's default color, never an interpolated RGB.
    #[default]
    Default,
    /// A concrete 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a color from its config-file spelling: `"default"` or `"#rrggbb"`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("default") {
            return Some(Color::Default);
        }
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Default => write!(f, "default"),
            Color::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// One character position's symbol and colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub foreground: Color,
    pub background: Color,
}

impl Cell {
    pub const fn new(symbol: char, foreground: Color, background: Color) -> Self {
        Self { symbol, foreground, background }
    }
}

/// The fallback cell: a space rendered in the terminal's own colors.
pub const DEFAULT_CELL: Cell = Cell::new(' ', Color::Default, Color::Default);

impl Default for Cell {
    fn default() -> Self {
        DEFAULT_CELL
    }
}
