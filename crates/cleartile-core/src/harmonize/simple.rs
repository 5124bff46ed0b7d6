use ndarray::Array2;
use tracing::debug;

use crate::band::{Band, BandTable};
use crate::composite::CompositeOutcome;
use crate::error::{ensure_same_shape, MosaicError, Result};

use super::policy::select_sample;
use super::stats::{masked_statistics, BandStatistics};
use super::{weighted_statistics, AcquisitionCorrection, BandCorrection, Harmonization, HarmonizationConfig};

/// Target = claim-weighted average of each acquisition's own statistics.
pub fn harmonize_simple<L>(
    outcome: &CompositeOutcome,
    mut load_band: L,
    config: &HarmonizationConfig,
) -> Result<Harmonization>
where
    L: FnMut(usize, Band) -> Result<Array2<f32>>,
{
    let total = outcome.tracking.len().max(1) as f64;
    let mut weights = Vec::with_capacity(outcome.contributions.len());
    let mut statistics: Vec<BandTable<BandStatistics>> =
        Vec::with_capacity(outcome.contributions.len());

    for contribution in &outcome.contributions {
        let claimed = outcome.claimed_pixels(contribution.index);
        weights.push(claimed as f64 / total);

        let mask = if claimed == 0 {
            None
        } else {
            let (policy, mask) = select_sample(
                &contribution.scl,
                &contribution.quality,
                config.min_sample_pixels,
            );
            debug!(
                index = contribution.index,
                classes = %policy.classes,
                min_quality = policy.min_quality,
                "Harmonization sample"
            );
            Some(mask)
        };

        let table = BandTable::try_from_fn(|band| {
            let values = load_band(contribution.index, band)?;
            ensure_same_shape(outcome.tracking.dim(), values.dim())?;
            let sampled = masked_statistics(&values, mask.as_ref()).unwrap_or_default();
            let stats = if sampled.is_degenerate() {
                masked_statistics(&values, None).unwrap_or_default()
            } else {
                sampled
            };
            Ok::<_, MosaicError>(stats)
        })?;
        statistics.push(table);
    }

    let targets = BandTable::from_fn(|band| {
        let samples: Vec<(f64, BandStatistics)> = weights
            .iter()
            .zip(&statistics)
            .map(|(&w, table)| (w, *table.get(band)))
            .collect();
        weighted_statistics(&samples)
    });

    let mut corrections = Vec::with_capacity(statistics.len());
    for (contribution, table) in outcome.contributions.iter().zip(&statistics) {
        let bands = BandTable::try_from_fn(|band| {
            BandCorrection::new(*table.get(band), *targets.get(band), band)
        })?;
        corrections.push(AcquisitionCorrection {
            index: contribution.index,
            bands,
        });
    }
    Ok(Harmonization { corrections })
}
