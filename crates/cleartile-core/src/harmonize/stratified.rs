use ndarray::{Array2, Zip};
use tracing::{debug, warn};

use crate::band::{Band, BandTable};
use crate::composite::CompositeOutcome;
use crate::consts::STRATIFIED_MIN_COVER;
use crate::error::{ensure_same_shape, MosaicError, Result};
use crate::scene::{Stratum, StratumTable};

use super::stats::{masked_statistics, BandStatistics};
use super::{weighted_statistics, AcquisitionCorrection, BandCorrection, Harmonization};

/// Target = per-stratum claim-weighted statistics mixed by global stratum share.
///
/// Strata are counted inside each acquisition's claimed region on the mosaic
/// classification; acquisitions claiming less than [`STRATIFIED_MIN_COVER`]
/// of the tile contribute no counts. Per-stratum statistics use the
/// acquisition's own classification.
pub fn harmonize_stratified<L>(outcome: &CompositeOutcome, mut load_band: L) -> Result<Harmonization>
where
    L: FnMut(usize, Band) -> Result<Array2<f32>>,
{
    warn!("Stratified harmonization is experimental");
    let total = outcome.tracking.len().max(1) as f64;

    let mut counts: Vec<StratumTable<usize>> = Vec::with_capacity(outcome.contributions.len());
    let mut statistics: Vec<BandTable<StratumTable<BandStatistics>>> =
        Vec::with_capacity(outcome.contributions.len());

    for contribution in &outcome.contributions {
        let value = contribution.index as u8;
        let claimed = outcome.claimed_pixels(contribution.index);
        let mut table = StratumTable::<usize>::default();
        if claimed as f64 / total >= STRATIFIED_MIN_COVER {
            Zip::from(&outcome.tracking)
                .and(&outcome.scl)
                .for_each(|&t, &s| {
                    if t == value {
                        if let Some(stratum) = Stratum::from_code(s) {
                            *table.get_mut(stratum) += 1;
                        }
                    }
                });
        }
        debug!(index = contribution.index, ?table, "Stratum counts");
        counts.push(table);

        let masks = StratumTable::from_fn(|stratum| {
            let code = stratum.class().code();
            contribution.scl.mapv(|s| s == code)
        });
        let band_stats = BandTable::try_from_fn(|band| {
            let values = load_band(contribution.index, band)?;
            ensure_same_shape(outcome.tracking.dim(), values.dim())?;
            Ok::<_, MosaicError>(StratumTable::from_fn(|stratum| {
                masked_statistics(&values, Some(masks.get(stratum))).unwrap_or_default()
            }))
        })?;
        statistics.push(band_stats);
    }

    let sums = StratumTable::from_fn(|stratum| counts.iter().map(|c| *c.get(stratum)).sum::<usize>());
    let valid: usize = sums.iter().map(|(_, &n)| n).sum();
    if valid == 0 {
        return Err(MosaicError::DegenerateStatistics {
            band: "all bands".into(),
        });
    }
    let ratios = StratumTable::from_fn(|stratum| *sums.get(stratum) as f64 / valid as f64);

    let mix = |table: &StratumTable<BandStatistics>| {
        let samples: Vec<(f64, BandStatistics)> = Stratum::ALL
            .iter()
            .map(|&s| (*ratios.get(s), *table.get(s)))
            .collect();
        weighted_statistics(&samples)
    };

    let targets = BandTable::from_fn(|band| {
        let per_stratum = StratumTable::from_fn(|stratum| {
            let sum = *sums.get(stratum);
            let samples: Vec<(f64, BandStatistics)> = counts
                .iter()
                .zip(&statistics)
                .map(|(c, st)| {
                    let w = if sum == 0 {
                        0.0
                    } else {
                        *c.get(stratum) as f64 / sum as f64
                    };
                    (w, *st.get(band).get(stratum))
                })
                .collect();
            weighted_statistics(&samples)
        });
        mix(&per_stratum)
    });

    let mut corrections = Vec::with_capacity(statistics.len());
    for (contribution, stats) in outcome.contributions.iter().zip(&statistics) {
        let bands = BandTable::try_from_fn(|band| {
            BandCorrection::new(mix(stats.get(band)), *targets.get(band), band)
        })?;
        corrections.push(AcquisitionCorrection {
            index: contribution.index,
            bands,
        });
    }
    Ok(Harmonization { corrections })
}
