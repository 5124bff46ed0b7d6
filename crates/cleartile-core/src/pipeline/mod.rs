//! End-to-end mosaic build: validate, rank, composite, harmonize, blend, write.

pub mod config;
mod helpers;
mod orchestrator;
mod types;

pub use config::{MosaicConfig, PipelineConfig};
pub use orchestrator::{
    build_mosaic, rank_manifest, run_mosaic, run_mosaic_reported, write_outputs,
};
pub use types::{MosaicOutput, NoOpReporter, PipelineStage, ProgressReporter};
