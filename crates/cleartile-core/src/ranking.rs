//! Reference selection and temporal ordering of acquisitions.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::acquisition::Acquisition;
use crate::consts::{DEFAULT_COARSE_FACTOR, DEFAULT_TIE_WINDOW, SECONDS_PER_DAY};
use crate::error::{MosaicError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    /// Percentage points above the lowest invalid percentage within which
    /// acquisitions are re-scored to pick the reference.
    pub tie_window: f64,
    /// Downsampling factor of the grid used for tie-break scoring.
    pub coarse_factor: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            tie_window: DEFAULT_TIE_WINDOW,
            coarse_factor: DEFAULT_COARSE_FACTOR,
        }
    }
}

/// One acquisition's place in the ranking.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedAcquisition {
    /// Index into the slice the ranking was built from.
    pub source_index: usize,
    /// Absolute time between this acquisition and the reference.
    pub time_difference: TimeDelta,
}

impl RankedAcquisition {
    pub fn days(&self) -> f64 {
        self.time_difference.num_seconds() as f64 / SECONDS_PER_DAY as f64
    }
}

/// Acquisitions ordered by time distance to the reference; entry 0 is the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    pub entries: Vec<RankedAcquisition>,
}

impl Ranking {
    pub fn reference(&self) -> &RankedAcquisition {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&RankedAcquisition> {
        self.entries.get(position)
    }
}

/// Pick the reference acquisition.
///
/// The lowest invalid percentage wins outright unless other acquisitions are
/// within `tie_window` percentage points of it; then every tied candidate is
/// scored with `scalar_score` (0..100) and the highest score wins. Candidates
/// sharing an id are scored once. Ties on score keep the lowest-invalid one.
pub fn select_reference<F>(
    acquisitions: &[Acquisition],
    params: &RankingParams,
    mut scalar_score: F,
) -> Result<usize>
where
    F: FnMut(usize) -> Result<f64>,
{
    let mut by_invalid: Vec<usize> = (0..acquisitions.len()).collect();
    by_invalid.sort_by(|&a, &b| {
        acquisitions[a]
            .invalid_percentage
            .total_cmp(&acquisitions[b].invalid_percentage)
    });
    let lowest = *by_invalid.first().ok_or(MosaicError::EmptySequence)?;
    let lowest_invalid = acquisitions[lowest].invalid_percentage;

    let mut tied: Vec<usize> = Vec::new();
    for i in by_invalid {
        let acq = &acquisitions[i];
        if acq.invalid_percentage - lowest_invalid <= params.tie_window
            && !tied.iter().any(|&t| acquisitions[t].id == acq.id)
        {
            tied.push(i);
        }
    }

    if tied.len() <= 1 {
        return Ok(lowest);
    }

    info!(candidates = tied.len(), "Scoring tied reference candidates");
    let mut best = lowest;
    let mut best_score = 0.0f64;
    for i in tied {
        let score = scalar_score(i)?;
        debug!(id = %acquisitions[i].id, score, "Reference candidate score");
        if score > best_score {
            best_score = score;
            best = i;
        }
    }
    Ok(best)
}

/// Order acquisitions by absolute time difference to `reference`.
///
/// The reference is always first; equal differences keep input order.
pub fn rank_by_time(acquisitions: &[Acquisition], reference: usize) -> Ranking {
    let reference_time = acquisitions[reference].timestamp;
    let mut entries: Vec<RankedAcquisition> = acquisitions
        .iter()
        .enumerate()
        .map(|(i, acq)| RankedAcquisition {
            source_index: i,
            time_difference: (acq.timestamp - reference_time).abs(),
        })
        .collect();
    entries.sort_by_key(|e| (e.time_difference, e.source_index != reference));
    Ranking { entries }
}

/// Select the reference and rank all acquisitions around it.
pub fn rank_acquisitions<F>(
    acquisitions: &[Acquisition],
    params: &RankingParams,
    scalar_score: F,
) -> Result<Ranking>
where
    F: FnMut(usize) -> Result<f64>,
{
    let reference = select_reference(acquisitions, params, scalar_score)?;
    info!(reference = %acquisitions[reference].id, "Selected reference acquisition");
    Ok(rank_by_time(acquisitions, reference))
}
