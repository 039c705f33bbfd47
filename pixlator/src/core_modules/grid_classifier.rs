// THEORY:
// The `grid_classifier` is the orchestration layer of the engine. It is not an
// analyzer itself: it runs the numbering, path and encoding stages for every
// group, runs the color aggregation over the whole grid, and packages both
// into one immutable `ClassificationResult`.
//
// Key architectural principles:
// 1.  **Two independent stages**: the group stage (numbering → path → encoding)
//     and the color stage only share read access to the grid. They can be run
//     one after the other (`classify`) or side by side (the parallel pipeline
//     calls `group_stage` and `color_aggregator::aggregate` on separate tasks
//     and hands both outputs to `ClassificationResult::assemble`).
// 2.  **All or nothing**: any stage error aborts the whole classification. A
//     result is only built once every stage has succeeded.
// 3.  **Per-pixel retention**: the result keeps the grid, the palette and the
//     group number of every pixel, not just the aggregated statistics, so the
//     highlighting layer can test any pixel in constant time.

use crate::core_modules::color_aggregator::{self, ColorStat};
use crate::core_modules::highlight::Highlight;
use crate::core_modules::numbering::{NumberingMode, group_assigner};
use crate::core_modules::palette::PaletteIndex;
use crate::core_modules::path_orderer::path_orderer;
use crate::core_modules::pixel_grid::{Dimensions, PixelGrid, Point};
use crate::core_modules::sequence_encoder::{Run, sequence_encoder};
use crate::error::Result;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// The run-length encoded color order of one group along its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStat {
    pub group_number: usize,
    pub sequence: Vec<Run>,
}

impl GroupStat {
    /// Pixels in the group.
    pub fn pixel_count(&self) -> usize {
        sequence_encoder::covered(&self.sequence)
    }
}

/// One cell of the serialized pixel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRecord {
    pub x: u32,
    pub y: u32,
    pub color_index: usize,
    pub group_number: usize,
}

/// The request parameters a result was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessingParams {
    pub width_bound: u32,
    pub color_count_hint: Option<u32>,
    pub processed_dimensions: Dimensions,
}

/// The output of the group stage: a group number per pixel (row-major) and
/// one `GroupStat` per group, in ascending group order.
pub type GroupStage = (Vec<usize>, Vec<GroupStat>);

/// Numbers the grid, orders every group along its path and encodes it.
pub fn group_stage(grid: &PixelGrid, mode: NumberingMode) -> Result<GroupStage> {
    let group_map = group_assigner::assign(grid, mode)?;

    let mut group_stats = Vec::with_capacity(group_map.group_count());
    for (group_number, members) in group_map.iter_groups() {
        let path = path_orderer::order(group_number, members);
        let sequence = sequence_encoder::encode(path.iter().map(|p| grid.cell(*p)));
        debug_assert_eq!(sequence_encoder::covered(&sequence), members.len());
        group_stats.push(GroupStat {
            group_number,
            sequence,
        });
    }

    Ok((group_map.into_numbers(), group_stats))
}

/// Runs both stages sequentially on the calling thread.
pub fn classify(
    grid: Arc<PixelGrid>,
    palette: Arc<PaletteIndex>,
    mode: NumberingMode,
) -> Result<ClassificationResult> {
    let color_stats = color_aggregator::aggregate(&grid, &palette)?;
    let (group_numbers, group_stats) = group_stage(&grid, mode)?;
    Ok(ClassificationResult::assemble(
        grid,
        palette,
        mode,
        group_numbers,
        color_stats,
        group_stats,
    ))
}

/// The immutable output bundle of one classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    numbering_mode: NumberingMode,
    processing_params: Option<ProcessingParams>,
    grid: Arc<PixelGrid>,
    palette: Arc<PaletteIndex>,
    /// Row-major, parallel to the grid cells.
    group_numbers: Vec<usize>,
    color_stats: Vec<ColorStat>,
    group_stats: Vec<GroupStat>,
}

impl ClassificationResult {
    pub(crate) fn assemble(
        grid: Arc<PixelGrid>,
        palette: Arc<PaletteIndex>,
        numbering_mode: NumberingMode,
        group_numbers: Vec<usize>,
        color_stats: Vec<ColorStat>,
        group_stats: Vec<GroupStat>,
    ) -> Self {
        debug_assert_eq!(group_numbers.len(), grid.pixel_count());
        Self {
            numbering_mode,
            processing_params: None,
            grid,
            palette,
            group_numbers,
            color_stats,
            group_stats,
        }
    }

    /// Records the request parameters, echoed in the serialized result.
    pub(crate) fn with_processing_params(
        mut self,
        width_bound: u32,
        color_count_hint: Option<u32>,
    ) -> Self {
        self.processing_params = Some(ProcessingParams {
            width_bound,
            color_count_hint,
            processed_dimensions: self.grid.dimensions(),
        });
        self
    }

    pub fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn numbering_mode(&self) -> NumberingMode {
        self.numbering_mode
    }

    pub fn processing_params(&self) -> Option<&ProcessingParams> {
        self.processing_params.as_ref()
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn palette(&self) -> &PaletteIndex {
        &self.palette
    }

    pub fn color_stats(&self) -> &[ColorStat] {
        &self.color_stats
    }

    pub fn group_stats(&self) -> &[GroupStat] {
        &self.group_stats
    }

    pub fn group_count(&self) -> usize {
        self.group_stats.len()
    }

    pub fn color_stat(&self, color_index: usize) -> Option<&ColorStat> {
        self.color_stats
            .binary_search_by_key(&color_index, |s| s.color_index)
            .ok()
            .map(|i| &self.color_stats[i])
    }

    pub fn group_stat(&self, group_number: usize) -> Option<&GroupStat> {
        self.group_stats.get(group_number)
    }

    pub fn group_number_at(&self, x: u32, y: u32) -> Option<usize> {
        self.grid
            .color_at(x, y)
            .map(|_| self.group_numbers[self.grid.offset(x, y)])
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PixelRecord> {
        let color_index = self.grid.color_at(x, y)?;
        Some(PixelRecord {
            x,
            y,
            color_index,
            group_number: self.group_numbers[self.grid.offset(x, y)],
        })
    }

    /// The pixel table as `pixel_data[y][x]`.
    pub fn pixel_data(&self) -> Vec<Vec<PixelRecord>> {
        let width = self.width() as usize;
        self.grid
            .iter()
            .zip(&self.group_numbers)
            .map(|((point, color_index), &group_number)| PixelRecord {
                x: point.x,
                y: point.y,
                color_index,
                group_number,
            })
            .collect::<Vec<_>>()
            .chunks(width)
            .map(<[PixelRecord]>::to_vec)
            .collect()
    }

    /// The pixels of a group in path order.
    pub fn group_path(&self, group_number: usize) -> Option<Vec<Point>> {
        if group_number >= self.group_stats.len() {
            return None;
        }
        let members: Vec<Point> = self
            .grid
            .iter()
            .zip(&self.group_numbers)
            .filter(|&(_, &g)| g == group_number)
            .map(|((point, _), _)| point)
            .collect();
        Some(path_orderer::order(group_number, &members))
    }

    pub fn matches(&self, highlight: &Highlight, x: u32, y: u32) -> bool {
        self.pixel(x, y).is_some_and(|p| {
            highlight.matches(&self.palette, p.color_index, p.group_number)
        })
    }

    /// Row-major mask of the cells selected by `highlight`.
    pub fn highlight_mask(&self, highlight: &Highlight) -> Vec<bool> {
        self.grid
            .iter()
            .zip(&self.group_numbers)
            .map(|((_, color_index), &group_number)| {
                highlight.matches(&self.palette, color_index, group_number)
            })
            .collect()
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[derive(Serialize)]
struct ResultView<'a> {
    dimensions: Dimensions,
    numbering_mode: NumberingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_params: Option<ProcessingParams>,
    palette: &'a PaletteIndex,
    pixel_data: Vec<Vec<PixelRecord>>,
    color_stats: &'a [ColorStat],
    group_stats: &'a [GroupStat],
}

impl Serialize for ClassificationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ResultView {
            dimensions: self.dimensions(),
            numbering_mode: self.numbering_mode,
            processing_params: self.processing_params,
            palette: &self.palette,
            pixel_data: self.pixel_data(),
            color_stats: &self.color_stats,
            group_stats: &self.group_stats,
        }
        .serialize(serializer)
    }
}
