//! Greedy temporal compositing: decide per pixel which acquisition is used.

pub mod driver;
pub mod tracking;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_THRESHOLD_DECAY, DEFAULT_THRESHOLD_SCALE};

pub use driver::composite;
pub use tracking::{
    CompositeOutcome, CompositorState, Contribution, Decision, ScoredAcquisition, Termination,
    TrackingCompositor,
};

/// Loop bounds and acceptance curve of the compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Stop once the average quality (percent) reaches this goal.
    pub ideal_percent: f64,
    /// Ignore acquisitions further than this many days from the reference.
    pub max_days: i64,
    /// Maximum number of acquisitions (reference included) in the mosaic.
    pub max_images_include: usize,
    /// Maximum number of candidates scanned after the reference.
    pub max_search_images: usize,
    /// `C1` in `threshold = C1 * exp(-C2 * average_quality)`.
    pub threshold_scale: f64,
    /// `C2` in `threshold = C1 * exp(-C2 * average_quality)`.
    pub threshold_decay: f64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            ideal_percent: 99.0,
            max_days: 30,
            max_images_include: 15,
            max_search_images: 35,
            threshold_scale: DEFAULT_THRESHOLD_SCALE,
            threshold_decay: DEFAULT_THRESHOLD_DECAY,
        }
    }
}

/// Minimum gain in average quality (percentage points) a candidate must bring.
///
/// Decays exponentially: lenient while the mosaic is poor, strict once it is good.
pub fn acceptance_threshold(average_quality: f64, config: &CompositorConfig) -> f64 {
    config.threshold_scale * (-config.threshold_decay * average_quality).exp()
}
