// THEORY:
// The `PaletteIndex` is the leaf of the engine: an immutable table from a small
// color index to its RGB triple and display hex. It is produced upstream (by
// whatever quantizer reduced the image) and only ever read here. Indices are
// contiguous from 0 because the table is a plain vector.
//
// The hex form is `#RRGGBB` in uppercase. It is computed once per entry so
// that highlighting by hex is a string comparison, not a formatting step per
// pixel.

use crate::error::{ClassifyError, Result};
use serde::Serialize;

pub type Rgb = [u8; 3];

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteColor {
    pub rgb: Rgb,
    pub hex: String,
}

impl PaletteColor {
    pub fn new(rgb: Rgb) -> Self {
        Self {
            rgb,
            hex: format_hex(rgb),
        }
    }
}

/// Immutable mapping from color index to RGB/hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PaletteIndex {
    entries: Vec<PaletteColor>,
}

impl PaletteIndex {
    pub fn new(colors: impl IntoIterator<Item = Rgb>) -> Result<Self> {
        let entries: Vec<PaletteColor> = colors.into_iter().map(PaletteColor::new).collect();
        if entries.is_empty() {
            return Err(ClassifyError::EmptyPalette);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<&PaletteColor> {
        self.entries.get(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    pub fn hex(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|c| c.hex.as_str())
    }

    /// Reverse lookup, used when a consumer highlights by hex.
    pub fn index_of_hex(&self, hex: &str) -> Option<usize> {
        self.entries.iter().position(|c| c.hex == hex)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PaletteColor] {
        &self.entries
    }
}

pub fn format_hex([r, g, b]: Rgb) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Parses `#RRGGBB` or `RRGGBB` in either case.
pub fn parse_hex(input: &str) -> Result<Rgb> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ClassifyError::InvalidHex(input.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| ClassifyError::InvalidHex(input.to_string()))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
