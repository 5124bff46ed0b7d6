use ndarray::{Array2, Zip};
use tracing::debug;

use crate::acquisition::{average_quality, QualityMap, TrackingArray};
use crate::consts::SECONDS_PER_DAY;
use crate::error::{ensure_same_shape, MosaicError, Result};
use crate::quality::change::change_mask;
use crate::quality::radiometric::haze_delta;
use crate::quality::QualityParams;
use crate::ranking::RankedAcquisition;

use super::{acceptance_threshold, CompositorConfig};

/// Highest ranking position a tracking array can hold.
const MAX_TRACKED_INDEX: usize = u8::MAX as usize;

/// Layers of one acquisition after quality assessment.
#[derive(Clone, Debug)]
pub struct ScoredAcquisition {
    pub scl: Array2<u8>,
    pub band_a: Array2<u16>,
    pub quality: QualityMap,
}

impl ScoredAcquisition {
    pub fn new(scl: Array2<u8>, band_a: Array2<u16>, quality: QualityMap) -> Result<Self> {
        ensure_same_shape(scl.dim(), band_a.dim())?;
        ensure_same_shape(scl.dim(), quality.dim())?;
        Ok(Self {
            scl,
            band_a,
            quality,
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.scl.dim()
    }
}

/// Snapshot kept for every accepted acquisition, used by harmonization.
#[derive(Clone, Debug)]
pub struct Contribution {
    /// Ranking position; the value written into the tracking array.
    pub index: usize,
    /// The acquisition's own scene classification.
    pub scl: Array2<u8>,
    /// The acquisition's own quality map.
    pub quality: QualityMap,
}

/// Outcome of evaluating one candidate against the current mosaic.
#[derive(Clone, Debug)]
pub struct Decision {
    pub index: usize,
    pub accepted: bool,
    /// Pixels the candidate would take over.
    pub change_mask: Array2<bool>,
    /// Quality map if the change mask were applied.
    pub merged_quality: QualityMap,
    /// Average quality (percent) if the change mask were applied.
    pub merged_average: f64,
    /// Average quality (percent) before this candidate.
    pub previous_average: f64,
    pub threshold: f64,
}

impl Decision {
    /// Gain in average quality (percentage points) the candidate would bring.
    pub fn improvement(&self) -> f64 {
        self.merged_average - self.previous_average
    }

    pub fn changed_pixels(&self) -> usize {
        self.change_mask.iter().filter(|&&v| v).count()
    }
}

/// Why the scan stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Average quality reached the configured goal.
    TargetReached,
    /// No ranked candidates left.
    CandidatesExhausted,
    /// `max_search_images` candidates were scanned.
    SearchLimit,
    /// `max_images_include` acquisitions were incorporated.
    IncludeLimit,
    /// The next candidate is older than `max_days`.
    AgeLimit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetReached => write!(f, "quality goal reached"),
            Self::CandidatesExhausted => write!(f, "no candidates left"),
            Self::SearchLimit => write!(f, "search limit reached"),
            Self::IncludeLimit => write!(f, "include limit reached"),
            Self::AgeLimit => write!(f, "age window exceeded"),
        }
    }
}

/// Lifecycle of a compositor. Accepted updates happen inside [`TrackingCompositor::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositorState {
    Init,
    Scanning,
    Terminated(Termination),
}

/// Result of a finished compositing run.
#[derive(Clone, Debug)]
pub struct CompositeOutcome {
    pub tracking: TrackingArray,
    /// Scene classification of the selected pixels.
    pub scl: Array2<u8>,
    pub quality: QualityMap,
    pub average_quality: f64,
    /// Average quality of the reference alone.
    pub initial_average: f64,
    /// Ranking positions of accepted acquisitions, reference first.
    pub processed_indices: Vec<usize>,
    /// One snapshot per entry of `processed_indices`, same order.
    pub contributions: Vec<Contribution>,
    pub scanned: usize,
    pub termination: Termination,
}

impl CompositeOutcome {
    /// More than one acquisition contributes; harmonization and feathering apply.
    pub fn is_multi_source(&self) -> bool {
        self.processed_indices.len() > 1
    }

    /// Number of pixels owned by ranking position `index`.
    pub fn claimed_pixels(&self, index: usize) -> usize {
        let value = index as u8;
        self.tracking.iter().filter(|&&v| v == value).count()
    }
}

/// Accumulator owning the working arrays of one mosaic build.
///
/// Starts from the reference (ranking position 0). Each candidate is first
/// evaluated into an immutable [`Decision`]; only [`apply`](Self::apply)
/// mutates the working set, and only for accepted decisions.
pub struct TrackingCompositor {
    config: CompositorConfig,
    params: QualityParams,
    tracking: TrackingArray,
    current_scl: Array2<u8>,
    current_band_a: Array2<u16>,
    current_quality: QualityMap,
    average_quality: f64,
    initial_average: f64,
    processed: Vec<usize>,
    contributions: Vec<Contribution>,
    scanned: usize,
    state: CompositorState,
}

impl TrackingCompositor {
    pub fn new(reference: ScoredAcquisition, config: CompositorConfig, params: QualityParams) -> Self {
        let average = average_quality(&reference.quality);
        let ScoredAcquisition {
            scl,
            band_a,
            quality,
        } = reference;
        Self {
            config,
            params,
            tracking: Array2::zeros(scl.dim()),
            contributions: vec![Contribution {
                index: 0,
                scl: scl.clone(),
                quality: quality.clone(),
            }],
            current_scl: scl,
            current_band_a: band_a,
            current_quality: quality,
            average_quality: average,
            initial_average: average,
            processed: vec![0],
            scanned: 0,
            state: CompositorState::Init,
        }
    }

    pub fn state(&self) -> CompositorState {
        self.state
    }

    pub fn average_quality(&self) -> f64 {
        self.average_quality
    }

    pub fn tracking(&self) -> &TrackingArray {
        &self.tracking
    }

    pub fn current_quality(&self) -> &QualityMap {
        &self.current_quality
    }

    pub fn processed_indices(&self) -> &[usize] {
        &self.processed
    }

    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn threshold(&self) -> f64 {
        acceptance_threshold(self.average_quality, &self.config)
    }

    /// Check the termination conditions before scanning `next`.
    ///
    /// Conditions are checked in order: quality goal, end of ranking, search
    /// limit, include limit, age window.
    pub fn next_termination(&self, next: Option<&RankedAcquisition>) -> Option<Termination> {
        if let CompositorState::Terminated(reason) = self.state {
            return Some(reason);
        }
        if self.average_quality >= self.config.ideal_percent {
            return Some(Termination::TargetReached);
        }
        let Some(next) = next else {
            return Some(Termination::CandidatesExhausted);
        };
        if self.scanned >= self.config.max_search_images {
            return Some(Termination::SearchLimit);
        }
        if self.processed.len() >= self.config.max_images_include {
            return Some(Termination::IncludeLimit);
        }
        if next.time_difference.num_seconds() > self.config.max_days * SECONDS_PER_DAY {
            return Some(Termination::AgeLimit);
        }
        None
    }

    /// Evaluate `candidate` (ranking position `index`) against the current mosaic.
    ///
    /// Pure: the working set is not modified.
    pub fn evaluate(&self, index: usize, candidate: &ScoredAcquisition) -> Result<Decision> {
        if index == 0 || index > MAX_TRACKED_INDEX {
            return Err(MosaicError::InvalidConfig(format!(
                "candidate position {index} outside 1..={MAX_TRACKED_INDEX}"
            )));
        }
        ensure_same_shape(self.tracking.dim(), candidate.dim())?;

        let haze = haze_delta(
            &self.current_quality,
            &self.current_band_a,
            &candidate.quality,
            &candidate.band_a,
            &self.params,
        )?;
        let mask = change_mask(
            &self.current_quality,
            &candidate.quality,
            &self.current_scl,
            &candidate.scl,
            &haze,
            &self.params.change_margins,
        )?;

        let merged_quality = Zip::from(&mask)
            .and(&candidate.quality)
            .and(&self.current_quality)
            .map_collect(|&m, &cq, &q| if m { cq } else { q });
        let merged_average = average_quality(&merged_quality);
        let threshold = self.threshold();
        let accepted = merged_average - self.average_quality > threshold;

        Ok(Decision {
            index,
            accepted,
            change_mask: mask,
            merged_quality,
            merged_average,
            previous_average: self.average_quality,
            threshold,
        })
    }

    /// Commit a decision. Rejected decisions only count as scanned.
    pub fn apply(&mut self, decision: Decision, candidate: ScoredAcquisition) -> Result<()> {
        if let CompositorState::Terminated(_) = self.state {
            return Err(MosaicError::InvalidConfig(
                "compositor already terminated".into(),
            ));
        }
        ensure_same_shape(self.tracking.dim(), candidate.dim())?;
        ensure_same_shape(self.tracking.dim(), decision.change_mask.dim())?;
        self.state = CompositorState::Scanning;
        self.scanned += 1;

        if !decision.accepted {
            debug!(index = decision.index, "Candidate rejected");
            return Ok(());
        }

        let value = decision.index as u8;
        Zip::from(&mut self.tracking)
            .and(&mut self.current_scl)
            .and(&mut self.current_band_a)
            .and(&decision.change_mask)
            .and(&candidate.scl)
            .and(&candidate.band_a)
            .for_each(|t, s, a, &m, &cs, &ca| {
                if m {
                    *t = value;
                    *s = cs;
                    *a = ca;
                }
            });
        self.current_quality = decision.merged_quality;
        self.average_quality = average_quality(&self.current_quality);
        self.processed.push(decision.index);
        self.contributions.push(Contribution {
            index: decision.index,
            scl: candidate.scl,
            quality: candidate.quality,
        });
        Ok(())
    }

    /// Enter the final state.
    pub fn terminate(&mut self, reason: Termination) {
        self.state = CompositorState::Terminated(reason);
    }

    /// Consume the compositor. Terminates with `CandidatesExhausted` if still scanning.
    pub fn finish(self) -> CompositeOutcome {
        let termination = match self.state {
            CompositorState::Terminated(reason) => reason,
            _ => Termination::CandidatesExhausted,
        };
        CompositeOutcome {
            tracking: self.tracking,
            scl: self.current_scl,
            quality: self.current_quality,
            average_quality: self.average_quality,
            initial_average: self.initial_average,
            processed_indices: self.processed,
            contributions: self.contributions,
            scanned: self.scanned,
            termination,
        }
    }
}
