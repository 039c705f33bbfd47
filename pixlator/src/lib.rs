// THEORY:
// This file is the main entry point for the `pixlator` library crate. It exposes
// the grid classification engine: given a pixel grid already reduced to a small
// palette, it numbers every pixel into ordered groups, run-length encodes each
// group along a snake path, and aggregates per-color statistics.
//
// `pipeline` is the synchronous, high-level interface (`ClassificationPipeline`,
// `ClassifyRequest`, `ClassificationResult`); `parallel_pipeline` runs many
// requests on a tokio worker pool. The individual stages live under
// `core_modules` and can be used on their own.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::EngineConfig;
pub use error::{ClassifyError, ConfigError, ErrorKind};
