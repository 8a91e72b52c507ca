//! Console color palette.
//!
//! Character-cell displays address color by palette index far more often than
//! by true color, so [`Color`] models the classic 16-entry console palette and
//! keeps a 24-bit escape hatch for sinks that support it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A console color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Black.
    #[default]
    Black,
    /// Dark blue.
    DarkBlue,
    /// Dark green.
    DarkGreen,
    /// Dark cyan.
    DarkCyan,
    /// Dark red.
    DarkRed,
    /// Dark magenta.
    DarkMagenta,
    /// Dark yellow.
    DarkYellow,
    /// Gray.
    Gray,
    /// Dark gray.
    DarkGray,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Cyan.
    Cyan,
    /// Red.
    Red,
    /// Magenta.
    Magenta,
    /// Yellow.
    Yellow,
    /// White.
    White,
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// The 16 palette colors in console index order.
    pub const PALETTE: [Self; 16] = [
        Self::Black,
        Self::DarkBlue,
        Self::DarkGreen,
        Self::DarkCyan,
        Self::DarkRed,
        Self::DarkMagenta,
        Self::DarkYellow,
        Self::Gray,
        Self::DarkGray,
        Self::Blue,
        Self::Green,
        Self::Cyan,
        Self::Red,
        Self::Magenta,
        Self::Yellow,
        Self::White,
    ];

    /// Palette index (0-15), or `None` for 24-bit colors.
    #[must_use]
    pub fn palette_index(self) -> Option<u8> {
        Self::PALETTE.iter().position(|c| *c == self).map(|i| i as u8)
    }

    /// Approximate RGB value of this color.
    ///
    /// Palette entries use the conventional VGA values.
    #[must_use]
    pub const fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Black => (0, 0, 0),
            Self::DarkBlue => (0, 0, 128),
            Self::DarkGreen => (0, 128, 0),
            Self::DarkCyan => (0, 128, 128),
            Self::DarkRed => (128, 0, 0),
            Self::DarkMagenta => (128, 0, 128),
            Self::DarkYellow => (128, 128, 0),
            Self::Gray => (192, 192, 192),
            Self::DarkGray => (128, 128, 128),
            Self::Blue => (0, 0, 255),
            Self::Green => (0, 255, 0),
            Self::Cyan => (0, 255, 255),
            Self::Red => (255, 0, 0),
            Self::Magenta => (255, 0, 255),
            Self::Yellow => (255, 255, 0),
            Self::White => (255, 255, 255),
            Self::Rgb(r, g, b) => (r, g, b),
        }
    }

    /// Parse a `#rrggbb` hex string.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkCyan => "dark_cyan",
            Self::DarkRed => "dark_red",
            Self::DarkMagenta => "dark_magenta",
            Self::DarkYellow => "dark_yellow",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Cyan => "cyan",
            Self::Red => "red",
            Self::Magenta => "magenta",
            Self::Yellow => "yellow",
            Self::White => "white",
            Self::Rgb(..) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            named => f.write_str(named.name().unwrap_or_default()),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        if let Some(color) = Self::PALETTE.iter().find(|c| c.name() == Some(normalized.as_str())) {
            return Ok(*color);
        }
        // "grey" spellings
        if let Some(color) = match normalized.as_str() {
            "grey" => Some(Self::Gray),
            "dark_grey" => Some(Self::DarkGray),
            _ => None,
        } {
            return Ok(color);
        }
        Self::from_hex(&normalized).ok_or_else(|| format!("unknown color '{s}'"))
    }
}

#[cfg(feature = "terminal")]
impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        use crossterm::style::Color as Ct;
        match color {
            Color::Black => Ct::Black,
            Color::DarkBlue => Ct::DarkBlue,
            Color::DarkGreen => Ct::DarkGreen,
            Color::DarkCyan => Ct::DarkCyan,
            Color::DarkRed => Ct::DarkRed,
            Color::DarkMagenta => Ct::DarkMagenta,
            Color::DarkYellow => Ct::DarkYellow,
            Color::Gray => Ct::Grey,
            Color::DarkGray => Ct::DarkGrey,
            Color::Blue => Ct::Blue,
            Color::Green => Ct::Green,
            Color::Cyan => Ct::Cyan,
            Color::Red => Ct::Red,
            Color::Magenta => Ct::Magenta,
            Color::Yellow => Ct::Yellow,
            Color::White => Ct::White,
            Color::Rgb(r, g, b) => Ct::Rgb { r, g, b },
        }
    }
}
