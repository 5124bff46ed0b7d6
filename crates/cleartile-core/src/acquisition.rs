use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::band::BandTable;
use crate::error::{ensure_same_shape, Result};

/// Per-pixel quality score in `0..=10`.
pub type QualityMap = Array2<u8>;

/// Per-pixel index (into the ranking) of the acquisition that sources the pixel.
pub type TrackingArray = Array2<u8>;

/// A single time-stamped acquisition of the tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub id: String,
    /// Tile identifier; all acquisitions of one mosaic must agree on it.
    pub tile: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Percentage (0..100) of pixels unusable due to cloud, shadow, nodata or snow.
    pub invalid_percentage: f64,
    pub paths: AcquisitionPaths,
}

/// Raster locations for one acquisition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionPaths {
    /// Scene classification layer at working resolution.
    pub scl: PathBuf,
    /// Aerosol band used for haze detection (`band_a`).
    pub aerosol: PathBuf,
    /// Blue band at working resolution (`band_b`).
    pub blue: PathBuf,
    /// Output-resolution spectral bands.
    pub bands: BandTable<PathBuf>,
}

/// Class percentages from product metadata whose sum is the invalid percentage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidBreakdown {
    pub nodata: f64,
    pub saturated_defective: f64,
    pub dark_features: f64,
    pub cloud_shadow: f64,
    pub medium_proba_clouds: f64,
    pub high_proba_clouds: f64,
    pub thin_cirrus: f64,
    pub snow_ice: f64,
}

impl InvalidBreakdown {
    pub fn invalid_percentage(&self) -> f64 {
        self.nodata
            + self.saturated_defective
            + self.dark_features
            + self.cloud_shadow
            + self.medium_proba_clouds
            + self.high_proba_clouds
            + self.thin_cirrus
            + self.snow_ice
    }
}

/// Working-resolution rasters needed to score an acquisition.
#[derive(Clone, Debug)]
pub struct AcquisitionLayers {
    /// Raw SCL codes.
    pub scl: Array2<u8>,
    /// Aerosol band (`band_a`).
    pub band_a: Array2<u16>,
    /// Blue band (`band_b`).
    pub band_b: Array2<u16>,
}

impl AcquisitionLayers {
    pub fn new(scl: Array2<u8>, band_a: Array2<u16>, band_b: Array2<u16>) -> Result<Self> {
        ensure_same_shape(scl.dim(), band_a.dim())?;
        ensure_same_shape(scl.dim(), band_b.dim())?;
        Ok(Self {
            scl,
            band_a,
            band_b,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.scl.dim()
    }
}

/// Mean of a quality map expressed as a percentage of the maximum score.
///
/// An empty map contributes nothing and scores 0.
pub fn average_quality(quality: &QualityMap) -> f64 {
    if quality.is_empty() {
        return 0.0;
    }
    let sum: u64 = quality.iter().map(|&q| q as u64).sum();
    (sum as f64 / quality.len() as f64) * 10.0
}
