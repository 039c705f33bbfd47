// THEORY:
// The `pipeline` module is the top-level API of the engine. It validates a
// classification request, runs the grid classifier and hands back one immutable
// `ClassificationResult`. It is stateless between calls: two requests never
// share anything but the immutable inputs the caller chooses to share. Caching
// or history belongs to whoever owns the pipeline.

use crate::config::EngineConfig;
use crate::core_modules::grid_classifier;
use crate::error::{ClassifyError, Result};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

// Re-export key data structures for the public API.
pub use crate::core_modules::color_aggregator::ColorStat;
pub use crate::core_modules::grid_classifier::{
    ClassificationResult, GroupStat, PixelRecord, ProcessingParams,
};
pub use crate::core_modules::highlight::Highlight;
pub use crate::core_modules::numbering::NumberingMode;
pub use crate::core_modules::palette::{PaletteColor, PaletteIndex};
pub use crate::core_modules::pixel_grid::{Dimensions, GridDocument, PixelGrid, Point};
pub use crate::core_modules::sequence_encoder::Run;

/// Parameters of one classification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyRequest {
    /// Longest side the upstream resize was asked to produce.
    pub width_bound: u32,
    /// Number of colors the upstream quantizer was asked for.
    pub color_count_hint: Option<u32>,
    pub numbering_mode: NumberingMode,
}

impl ClassifyRequest {
    pub fn new(width_bound: u32) -> Self {
        Self {
            width_bound,
            color_count_hint: None,
            numbering_mode: NumberingMode::default(),
        }
    }

    /// A request carrying the configured defaults.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            width_bound: config.default_width_bound,
            color_count_hint: Some(config.default_color_count),
            numbering_mode: config.default_numbering_mode,
        }
    }

    /// Builds a request from raw parameters, rejecting an unknown mode name.
    pub fn parse(
        width_bound: u32,
        color_count_hint: Option<u32>,
        numbering_mode: &str,
    ) -> Result<Self> {
        let request = Self {
            width_bound,
            color_count_hint,
            numbering_mode: numbering_mode.parse()?,
        };
        request.check_ranges(u32::MAX)?;
        Ok(request)
    }

    pub fn color_count_hint(mut self, hint: u32) -> Self {
        self.color_count_hint = Some(hint);
        self
    }

    pub fn numbering_mode(mut self, mode: NumberingMode) -> Self {
        self.numbering_mode = mode;
        self
    }

    fn check_ranges(&self, max_width_bound: u32) -> Result<()> {
        if self.width_bound == 0 || self.width_bound > max_width_bound {
            return Err(ClassifyError::InvalidWidthBound {
                got: self.width_bound,
                max: max_width_bound,
            });
        }
        if self.color_count_hint == Some(0) {
            return Err(ClassifyError::InvalidColorCountHint);
        }
        Ok(())
    }

    /// Parameter checks, run before any computation.
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        self.check_ranges(config.max_width_bound)
    }

    /// The grid must fit inside the bound the upstream resize was given.
    pub fn check_grid(&self, grid: &PixelGrid) -> Result<()> {
        let longest = grid.width().max(grid.height());
        if longest > self.width_bound {
            return Err(ClassifyError::ExceedsBound {
                width: grid.width() as usize,
                height: grid.height() as usize,
                bound: self.width_bound,
            });
        }
        Ok(())
    }

    pub(crate) fn note_color_count(&self, distinct_colors: usize) {
        if let Some(hint) = self.color_count_hint {
            if distinct_colors > hint as usize {
                warn!(
                    "grid uses {} distinct colors, more than the requested {}",
                    distinct_colors, hint
                );
            }
        }
    }
}

/// The synchronous entry point of the engine.
#[derive(Debug, Clone, Default)]
pub struct ClassificationPipeline {
    config: EngineConfig,
}

impl ClassificationPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classifies one grid. Either every stage succeeds and a full result is
    /// returned, or the first failure is.
    pub fn classify(
        &self,
        request: &ClassifyRequest,
        grid: impl Into<Arc<PixelGrid>>,
        palette: impl Into<Arc<PaletteIndex>>,
    ) -> Result<ClassificationResult> {
        let grid = grid.into();
        let palette = palette.into();
        let started = Instant::now();
        info!(
            "classifying {}x{} grid with {} palette entries, mode {}",
            grid.width(),
            grid.height(),
            palette.len(),
            request.numbering_mode
        );

        let outcome = request
            .validate(&self.config)
            .and_then(|_| request.check_grid(&grid))
            .and_then(|_| grid_classifier::classify(grid, palette, request.numbering_mode))
            .map(|result| {
                result.with_processing_params(request.width_bound, request.color_count_hint)
            });

        match outcome {
            Ok(result) => {
                request.note_color_count(result.color_stats().len());
                debug!(
                    "{} groups, {} colors in {:?}",
                    result.group_count(),
                    result.color_stats().len(),
                    started.elapsed()
                );
                Ok(result)
            }
            Err(err) => {
                error!("classification failed: {}", err);
                Err(err)
            }
        }
    }

    /// Unpacks an upstream grid document and classifies it.
    pub fn classify_document(
        &self,
        request: &ClassifyRequest,
        document: GridDocument,
    ) -> Result<ClassificationResult> {
        let (grid, palette) = document.into_parts()?;
        self.classify(request, grid, palette)
    }
}
