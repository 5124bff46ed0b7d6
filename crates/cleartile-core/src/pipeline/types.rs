use std::path::PathBuf;

use ndarray::Array2;

use crate::acquisition::{QualityMap, TrackingArray};
use crate::band::BandTable;
use crate::composite::Termination;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Ranking,
    Compositing,
    Harmonizing,
    Filtering,
    Feathering,
    Blending,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "Validating acquisitions"),
            Self::Ranking => write!(f, "Ranking acquisitions"),
            Self::Compositing => write!(f, "Compositing"),
            Self::Harmonizing => write!(f, "Harmonizing bands"),
            Self::Filtering => write!(f, "Filtering tracking array"),
            Self::Feathering => write!(f, "Computing feathers"),
            Self::Blending => write!(f, "Blending bands"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g. candidates to scan), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_mosaic` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// A finished mosaic at output resolution.
#[derive(Clone, Debug)]
pub struct MosaicOutput {
    pub tracking: TrackingArray,
    pub scl: Array2<u8>,
    pub bands: BandTable<Array2<u16>>,
    /// Working-resolution quality of the selected pixels.
    pub quality: QualityMap,
    pub reference_id: String,
    /// Ids of the accepted acquisitions, reference first. Position `i`
    /// is the acquisition written as value `processed_indices[i]`.
    pub accepted_ids: Vec<String>,
    pub processed_indices: Vec<usize>,
    pub initial_quality: f64,
    pub average_quality: f64,
    pub scanned: usize,
    pub termination: Termination,
    pub harmonized: bool,
    pub feathered: bool,
    /// Files written by [`super::run_mosaic`]; empty for in-memory builds.
    pub written: Vec<PathBuf>,
}

impl MosaicOutput {
    pub fn is_pass_through(&self) -> bool {
        self.processed_indices.len() <= 1
    }
}
