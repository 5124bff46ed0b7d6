//! Per-pixel radiometric quality scoring.
//!
//! Scores run from 0 (certainly unusable) to 10 (certainly usable land or
//! water). [`assess`] runs the full per-acquisition preparation: nodata
//! dilation, point-wise scoring and spatial refinement.

pub mod assess;
pub mod change;
pub mod radiometric;
pub mod spatial;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BLUR_WINDOW, DEFAULT_BRIGHT_BLUE, DEFAULT_EROSION_RADIUS, DEFAULT_HAZE_HIGH,
    DEFAULT_HAZE_LOW, DEFAULT_HAZE_MARGIN, DEFAULT_HAZE_RATIO, DEFAULT_NODATA_DILATION_RADIUS,
};

/// Tuning of the quality scorer. Reflectances are L2A digital numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityParams {
    /// Aerosol reflectance above which clear pixels lose one point.
    pub haze_low: u16,
    /// Aerosol reflectance above which clear pixels lose two points.
    pub haze_high: u16,
    /// Blue reflectance below which a cloud-classified pixel is likely bright ground.
    pub bright_blue: u16,
    /// Relative aerosol change that flags haze between acquisitions.
    pub haze_ratio: f32,
    /// Absolute aerosol change that flags haze between acquisitions.
    pub haze_margin: u16,
    /// Disk radius (pixels) by which nodata is grown before scoring.
    pub nodata_dilation_radius: usize,
    /// Disk radius (pixels) of the grey erosion that exposes isolated islands.
    pub erosion_radius: usize,
    /// Box window (pixels) of the mean quality that feeds the distance field.
    pub blur_window: usize,
    /// Pixels closer than this to poor quality are candidates for island smoothing.
    pub island_distance: f32,
    /// Distance at which the scalar score's spatial term saturates.
    pub distance_cap: f32,
    /// Extra quality a candidate needs over the current selection, per class.
    pub change_margins: ChangeMargins,
}

impl Default for QualityParams {
    fn default() -> Self {
        Self {
            haze_low: DEFAULT_HAZE_LOW,
            haze_high: DEFAULT_HAZE_HIGH,
            bright_blue: DEFAULT_BRIGHT_BLUE,
            haze_ratio: DEFAULT_HAZE_RATIO,
            haze_margin: DEFAULT_HAZE_MARGIN,
            nodata_dilation_radius: DEFAULT_NODATA_DILATION_RADIUS,
            erosion_radius: DEFAULT_EROSION_RADIUS,
            blur_window: DEFAULT_BLUR_WINDOW,
            island_distance: 10.0,
            distance_cap: 100.0,
            change_margins: ChangeMargins::default(),
        }
    }
}

impl QualityParams {
    /// Parameters for scoring on a grid downsampled by `factor`.
    ///
    /// Radii and windows shrink with the grid so they keep their ground size.
    pub fn coarse(&self, factor: usize) -> Self {
        let factor = factor.max(1);
        let window = (self.blur_window / factor).max(1) | 1;
        Self {
            nodata_dilation_radius: self.nodata_dilation_radius / factor,
            erosion_radius: self.erosion_radius / factor,
            blur_window: window,
            ..self.clone()
        }
    }
}

/// Quality margin a candidate must exceed to replace a pixel, by candidate class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeMargins {
    pub water: u8,
    pub other: u8,
}

impl Default for ChangeMargins {
    fn default() -> Self {
        Self { water: 1, other: 0 }
    }
}
