//! Seam-free merging of the accepted acquisitions.

pub mod feather;
pub mod merge;

use serde::{Deserialize, Serialize};

use crate::acquisition::TrackingArray;
use crate::morphology::filters::mode_filter;

pub use feather::FeatherWeights;
pub use merge::{blend_band, finish_band};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Distance-weighted blending across seams; hard cut when off.
    pub feather: bool,
    /// Distance (output pixels) over which a contribution fades out.
    pub feather_distance: f32,
    /// Majority-filter the tracking array before blending.
    pub filter_tracking: bool,
    pub filter_tracking_radius: usize,
    pub filter_tracking_iterations: usize,
    /// 3x3 median filter on every blended band.
    pub noise_reduction: bool,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            feather: true,
            feather_distance: 31.0,
            filter_tracking: true,
            filter_tracking_radius: 3,
            filter_tracking_iterations: 1,
            noise_reduction: true,
        }
    }
}

/// Remove speckle from the tracking array with a disk majority filter.
pub fn smooth_tracking(tracking: &TrackingArray, config: &BlendConfig) -> TrackingArray {
    if !config.filter_tracking || config.filter_tracking_iterations == 0 {
        return tracking.clone();
    }
    mode_filter(
        tracking,
        config.filter_tracking_radius,
        config.filter_tracking_iterations,
    )
}
