// THEORY:
// The `ColorAggregator` produces the global statistics panel data: for each
// color that actually appears, how many cells use it and where they are. It
// is independent of numbering, so it can run alongside the group computation
// on the same immutable grid.
//
// One row-major pass fills a slot per palette index. Slots that stay empty are
// dropped, so palette colors with zero occurrences never appear, and the
// survivors come out in ascending color index. A cell whose index has no
// palette entry aborts the pass with the offending coordinate; no default color
// is ever substituted.

use crate::core_modules::palette::{PaletteIndex, Rgb};
use crate::core_modules::pixel_grid::{PixelGrid, Point};
use crate::error::{ClassifyError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorStat {
    pub color_index: usize,
    pub rgb: Rgb,
    pub hex: String,
    pub count: usize,
    /// Row-major scan order.
    pub positions: Vec<Point>,
}

pub fn aggregate(grid: &PixelGrid, palette: &PaletteIndex) -> Result<Vec<ColorStat>> {
    let mut slots: Vec<Option<ColorStat>> = vec![None; palette.len()];

    for (point, color_index) in grid.iter() {
        let entry = palette
            .get(color_index)
            .ok_or_else(|| ClassifyError::UnknownColorIndex {
                x: point.x,
                y: point.y,
                index: color_index,
                palette_len: palette.len(),
            })?;

        let stat = slots[color_index].get_or_insert_with(|| ColorStat {
            color_index,
            rgb: entry.rgb,
            hex: entry.hex.clone(),
            count: 0,
            positions: Vec::new(),
        });
        stat.count += 1;
        stat.positions.push(point);
    }

    Ok(slots.into_iter().flatten().collect())
}
