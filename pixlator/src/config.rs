// THEORY:
// `EngineConfig` holds the tunables of the engine and of the worker pool that
// wraps it. Defaults match the pixelation service that feeds the engine
// (a 100 px default bound, a 500 px hard cap, 8 colors). Every field can be
// overridden from a `PIXLATOR_*` environment variable. A value that does not
// parse is an error rather than a silent fallback.

use crate::core_modules::numbering::NumberingMode;
use crate::error::ConfigError;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Width bound used when a request does not name one.
    pub default_width_bound: u32,
    /// The largest width bound a request may ask for.
    pub max_width_bound: u32,
    /// Color count hint used when a request does not name one.
    pub default_color_count: u32,
    pub default_numbering_mode: NumberingMode,
    /// Number of workers in the parallel pipeline.
    pub worker_count: usize,
    /// Fixed part of the per-request time bound.
    pub timeout_base_ms: u64,
    /// Per-pixel part of the per-request time bound.
    pub timeout_per_pixel_us: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_width_bound: 100,
            max_width_bound: 500,
            default_color_count: 8,
            default_numbering_mode: NumberingMode::DiagonalBottomRight,
            worker_count: num_cpus::get().max(1),
            timeout_base_ms: 250,
            timeout_per_pixel_us: 20,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for each
    /// `PIXLATOR_*` variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse(&lookup, "PIXLATOR_DEFAULT_MAX_SIZE")? {
            config.default_width_bound = at_least("PIXLATOR_DEFAULT_MAX_SIZE", v, 1)?;
        }
        if let Some(v) = parse(&lookup, "PIXLATOR_MAX_PROCESSING_SIZE")? {
            config.max_width_bound = at_least("PIXLATOR_MAX_PROCESSING_SIZE", v, 1)?;
        }
        if let Some(v) = parse(&lookup, "PIXLATOR_DEFAULT_COLOR_COUNT")? {
            config.default_color_count = at_least("PIXLATOR_DEFAULT_COLOR_COUNT", v, 1)?;
        }
        if let Some(v) = parse(&lookup, "PIXLATOR_NUMBERING_MODE")? {
            config.default_numbering_mode = v;
        }
        if let Some(v) = parse::<u32, _>(&lookup, "PIXLATOR_WORKERS")? {
            config.worker_count = at_least("PIXLATOR_WORKERS", v, 1)? as usize;
        }
        if let Some(v) = parse(&lookup, "PIXLATOR_TIMEOUT_BASE_MS")? {
            config.timeout_base_ms = v;
        }
        if let Some(v) = parse(&lookup, "PIXLATOR_TIMEOUT_PER_PIXEL_US")? {
            config.timeout_per_pixel_us = v;
        }

        if config.default_width_bound > config.max_width_bound {
            return Err(ConfigError::OutOfRange {
                name: "PIXLATOR_MAX_PROCESSING_SIZE",
                value: config.max_width_bound as u64,
                min: config.default_width_bound as u64,
            });
        }

        Ok(config)
    }

    /// External time bound for classifying `pixels` cells.
    pub fn time_limit(&self, pixels: usize) -> Duration {
        Duration::from_millis(self.timeout_base_ms)
            + Duration::from_micros(self.timeout_per_pixel_us.saturating_mul(pixels as u64))
    }
}

fn parse<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => {
            let parsed = raw.trim().parse::<T>();
            parsed
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue { name, value: raw })
        }
    }
}

fn at_least<T>(name: &'static str, value: T, min: T) -> Result<T, ConfigError>
where
    T: PartialOrd + Into<u64> + Copy,
{
    if value < min {
        return Err(ConfigError::OutOfRange {
            name,
            value: value.into(),
            min: min.into(),
        });
    }
    Ok(value)
}
