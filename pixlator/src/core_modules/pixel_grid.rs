// THEORY:
// The `PixelGrid` is the input to everything else: a W×H matrix of color
// indices, already reduced upstream to a small palette. It is a "dumb" data
// container, immutable once built, stored flat in row-major order so that the
// `(x, y)` → cell mapping is a multiply and an add.
//
// Key principles:
// 1.  **Validated at the boundary**: a grid can only be built with non-zero
//     width and height and with every row the same length. Whether each index
//     exists in the palette is checked by the aggregation layer, which reports
//     the first offending coordinate.
// 2.  **Row-major everywhere**: iteration order, position lists and the serialized
//     pixel table all follow scan order (y outer, x inner).
// 3.  **Upstream adapters**: a decoded, already-quantized RGB buffer or a JSON
//     grid document can be turned into a `(PixelGrid, PaletteIndex)` pair.

use crate::core_modules::palette::{PaletteIndex, Rgb};
use crate::error::{ClassifyError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A grid coordinate. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (u32, u32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    dimensions: Dimensions,
    /// Flattened row-major color indices.
    cells: Vec<usize>,
}

impl PixelGrid {
    /// Builds a grid from rows of color indices.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(ClassifyError::ZeroDimension { width, height });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(ClassifyError::RaggedRow {
                    row,
                    len: values.len(),
                    expected: width,
                });
            }
            cells.extend(values);
        }

        Ok(Self {
            dimensions: Dimensions {
                width: width as u32,
                height: height as u32,
            },
            cells,
        })
    }

    /// Indexes an already-quantized RGB buffer. Palette indices are handed out
    /// in order of first appearance in a row-major scan.
    pub fn from_rgb_image(image: &image::RgbImage) -> Result<(Self, PaletteIndex)> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifyError::ZeroDimension {
                width: width as usize,
                height: height as usize,
            });
        }

        let mut color_to_index: HashMap<Rgb, usize> = HashMap::new();
        let mut colors: Vec<Rgb> = Vec::new();
        let mut cells = Vec::with_capacity(width as usize * height as usize);

        for (_, _, pixel) in image.enumerate_pixels() {
            let rgb = pixel.0;
            let index = *color_to_index.entry(rgb).or_insert_with(|| {
                colors.push(rgb);
                colors.len() - 1
            });
            cells.push(index);
        }

        let grid = Self {
            dimensions: Dimensions { width, height },
            cells,
        };
        Ok((grid, PaletteIndex::new(colors)?))
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn pixel_count(&self) -> usize {
        self.cells.len()
    }

    /// The color index at `(x, y)`, or `None` outside the grid.
    pub fn color_at(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        self.cells.get(self.offset(x, y)).copied()
    }

    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }

    /// Color of a point known to lie inside the grid.
    #[inline]
    pub(crate) fn cell(&self, point: Point) -> usize {
        self.cells[self.offset(point.x, point.y)]
    }

    /// Cells in row-major order as `(point, color_index)`.
    pub fn iter(&self) -> impl Iterator<Item = (Point, usize)> + '_ {
        let width = self.dimensions.width as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &color)| (Point::new((i % width) as u32, (i / width) as u32), color))
    }
}

/// The JSON form of an upstream hand-off: a palette and the grid of indices.
///
/// ```json
/// { "palette": [[0, 0, 0], [255, 255, 255]], "grid": [[0, 1], [1, 0]] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDocument {
    pub palette: Vec<Rgb>,
    pub grid: Vec<Vec<usize>>,
}

impl GridDocument {
    pub fn into_parts(self) -> Result<(PixelGrid, PaletteIndex)> {
        let palette = PaletteIndex::new(self.palette)?;
        let grid = PixelGrid::from_rows(self.grid)?;
        Ok((grid, palette))
    }
}
