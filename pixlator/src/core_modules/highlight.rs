// THEORY:
// Highlighting is a membership test the statistics and grid panels run per
// pixel: "is this cell the color I clicked?" or "is this cell on the group I
// clicked?". The classification result keeps, per pixel, both the color index
// and the group number, so either question is a single comparison.

use crate::core_modules::palette::{PaletteIndex, format_hex, parse_hex};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// Normalised `#RRGGBB` hex.
    Color(String),
    Group(usize),
}

impl Highlight {
    /// Accepts `#rrggbb` or `RRGGBB`, in any case.
    pub fn color(hex: &str) -> Result<Self> {
        Ok(Self::Color(format_hex(parse_hex(hex)?)))
    }

    pub fn group(group_number: usize) -> Self {
        Self::Group(group_number)
    }

    #[inline]
    pub fn matches(&self, palette: &PaletteIndex, color_index: usize, group_number: usize) -> bool {
        match self {
            Highlight::Color(hex) => palette.hex(color_index) == Some(hex.as_str()),
            Highlight::Group(group) => *group == group_number,
        }
    }
}
