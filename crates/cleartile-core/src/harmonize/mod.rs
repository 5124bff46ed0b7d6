//! Cross-acquisition radiometric harmonization by robust statistics matching.

pub mod policy;
pub mod simple;
pub mod stats;
pub mod stratified;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::band::{Band, BandTable};
use crate::composite::CompositeOutcome;
use crate::error::{MosaicError, Result};

pub use policy::{select_sample, ClassSet, SamplePolicy};
pub use stats::{masked_statistics, robust_statistics, BandStatistics};

/// How target statistics are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonizationPolicy {
    /// Claim-weighted average of per-acquisition statistics.
    #[default]
    Simple,
    /// Land-cover stratum weighted statistics. Experimental.
    Stratified,
}

impl std::fmt::Display for HarmonizationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "Simple"),
            Self::Stratified => write!(f, "Stratified (experimental)"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonizationConfig {
    pub enabled: bool,
    pub policy: HarmonizationPolicy,
    /// Smallest sample a ladder rung must select to be used.
    pub min_sample_pixels: usize,
}

impl Default for HarmonizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: HarmonizationPolicy::Simple,
            min_sample_pixels: 1,
        }
    }
}

/// Linear remapping of one band of one acquisition onto the target statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandCorrection {
    pub source_median: f64,
    pub source_madstd: f64,
    pub target_median: f64,
    pub target_madstd: f64,
}

impl BandCorrection {
    pub fn identity() -> Self {
        Self {
            source_median: 0.0,
            source_madstd: 1.0,
            target_median: 0.0,
            target_madstd: 1.0,
        }
    }

    /// Build a correction, substituting the target for non-positive source statistics.
    pub fn new(source: BandStatistics, target: BandStatistics, band: Band) -> Result<Self> {
        let source_median = if source.median > 0.0 {
            source.median
        } else {
            target.median
        };
        let source_madstd = if source.madstd > 0.0 {
            source.madstd
        } else {
            target.madstd
        };
        if source_madstd <= 0.0 {
            return Err(MosaicError::DegenerateStatistics {
                band: band.to_string(),
            });
        }
        Ok(Self {
            source_median,
            source_madstd,
            target_median: target.median,
            target_madstd: target.madstd,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.source_median == self.target_median && self.source_madstd == self.target_madstd
    }

    /// Corrected value, clamped to be non-negative.
    pub fn apply(&self, raw: f32) -> f32 {
        if self.is_identity() {
            return raw.max(0.0);
        }
        let corrected = (raw as f64 - self.source_median) * self.target_madstd / self.source_madstd
            + self.target_median;
        corrected.max(0.0) as f32
    }

    pub fn apply_array(&self, raw: &Array2<f32>) -> Array2<f32> {
        raw.mapv(|v| self.apply(v))
    }
}

/// Per-band corrections of one accepted acquisition.
#[derive(Clone, Debug, PartialEq)]
pub struct AcquisitionCorrection {
    /// Ranking position, as stored in the tracking array.
    pub index: usize,
    pub bands: BandTable<BandCorrection>,
}

/// Corrections for every accepted acquisition, in acceptance order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Harmonization {
    pub corrections: Vec<AcquisitionCorrection>,
}

impl Harmonization {
    pub fn for_index(&self, index: usize) -> Option<&BandTable<BandCorrection>> {
        self.corrections
            .iter()
            .find(|c| c.index == index)
            .map(|c| &c.bands)
    }

    /// Correction for `band` of `index`; identity when the acquisition is unknown.
    pub fn correction(&self, index: usize, band: Band) -> BandCorrection {
        self.for_index(index)
            .map(|bands| *bands.get(band))
            .unwrap_or_else(BandCorrection::identity)
    }
}

/// Derive corrections for every contribution of `outcome`.
///
/// `load_band(index, band)` returns the band of ranking position `index` on
/// the working grid.
pub fn harmonize<L>(
    outcome: &CompositeOutcome,
    load_band: L,
    config: &HarmonizationConfig,
) -> Result<Harmonization>
where
    L: FnMut(usize, Band) -> Result<Array2<f32>>,
{
    match config.policy {
        HarmonizationPolicy::Simple => simple::harmonize_simple(outcome, load_band, config),
        HarmonizationPolicy::Stratified => stratified::harmonize_stratified(outcome, load_band),
    }
}

/// Weighted mean of statistics; zero when all weights vanish.
pub(crate) fn weighted_statistics(samples: &[(f64, BandStatistics)]) -> BandStatistics {
    let total: f64 = samples.iter().map(|(w, _)| w).sum();
    if total <= 0.0 {
        return BandStatistics::default();
    }
    let (median, madstd) = samples.iter().fold((0.0, 0.0), |(m, s), (w, st)| {
        (m + w * st.median, s + w * st.madstd)
    });
    BandStatistics {
        median: median / total,
        madstd: madstd / total,
    }
}
