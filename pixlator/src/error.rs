// THEORY:
// Every way a classification request can fail is named here. The engine is a
// pure transformation, so there are no transient failures inside it: a request
// either violates the upstream contract (input consistency), carries a bad
// parameter, or is abandoned by the async pool around the engine.

use thiserror::Error;

/// The broad class of a [`ClassifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upstream collaborator broke its contract. Fatal, never retried.
    InputConsistency,
    /// The caller supplied an invalid parameter. Rejected before any computation.
    Parameter,
    /// The worker pool could not deliver a result.
    Execution,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("grid dimensions cannot be zero, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },

    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("pixel ({x}, {y}) references color index {index}, palette has {palette_len} entries")]
    UnknownColorIndex {
        x: u32,
        y: u32,
        index: usize,
        palette_len: usize,
    },

    #[error("group {group} has no pixels under numbering mode {mode}")]
    EmptyGroup { group: usize, mode: String },

    #[error("grid {width}x{height} exceeds width bound {bound}")]
    ExceedsBound {
        width: usize,
        height: usize,
        bound: u32,
    },

    #[error("palette has no entries")]
    EmptyPalette,

    #[error("unrecognized numbering mode `{0}`")]
    UnknownNumberingMode(String),

    #[error("width bound must be between 1 and {max}, got {got}")]
    InvalidWidthBound { got: u32, max: u32 },

    #[error("color count hint must be positive")]
    InvalidColorCountHint,

    #[error("invalid hex color `{0}`")]
    InvalidHex(String),

    #[error("classification of {pixels} pixels exceeded {limit_ms} ms")]
    TimedOut { pixels: usize, limit_ms: u128 },

    #[error("worker pool is unavailable")]
    WorkerUnavailable,

    #[error("{stage} stage panicked")]
    StagePanicked { stage: &'static str },
}

impl ClassifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroDimension { .. }
            | Self::RaggedRow { .. }
            | Self::UnknownColorIndex { .. }
            | Self::EmptyGroup { .. }
            | Self::ExceedsBound { .. }
            | Self::EmptyPalette => ErrorKind::InputConsistency,
            Self::UnknownNumberingMode(_)
            | Self::InvalidWidthBound { .. }
            | Self::InvalidColorCountHint
            | Self::InvalidHex(_) => ErrorKind::Parameter,
            Self::TimedOut { .. } | Self::WorkerUnavailable | Self::StagePanicked { .. } => {
                ErrorKind::Execution
            }
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::InputConsistency
    }
}

/// Malformed engine configuration in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value `{value}`")]
    InvalidValue { name: &'static str, value: String },

    #[error("{name} must be at least {min}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
    },
}

pub type Result<T, E = ClassifyError> = std::result::Result<T, E>;
