use ndarray::{Array2, Zip};

use crate::acquisition::TrackingArray;
use crate::band::Band;
use crate::error::{ensure_same_shape, MosaicError, Result};
use crate::harmonize::Harmonization;
use crate::morphology::filters::median_filter_3x3;

use super::feather::FeatherWeights;

/// Merge one band of every accepted acquisition into a mosaic band.
///
/// `indices` lists ranking positions, reference first. `load(index)` returns
/// the raw band of a position at output resolution. With `weights` the result
/// is the weighted sum of corrected bands; without, each pixel is taken from
/// the acquisition that owns it.
pub fn blend_band<L>(
    tracking: &TrackingArray,
    indices: &[usize],
    band: Band,
    harmonization: Option<&Harmonization>,
    weights: Option<&FeatherWeights>,
    mut load: L,
) -> Result<Array2<f32>>
where
    L: FnMut(usize) -> Result<Array2<f32>>,
{
    let (&reference, rest) = indices.split_first().ok_or(MosaicError::EmptySequence)?;
    let corrected = |index: usize, raw: Array2<f32>| match harmonization {
        Some(h) => h.correction(index, band).apply_array(&raw),
        None => raw,
    };

    let base = load(reference)?;
    ensure_same_shape(tracking.dim(), base.dim())?;
    let base = corrected(reference, base);

    match weights {
        Some(weights) => {
            let mut output = Array2::<f32>::zeros(tracking.dim());
            accumulate(&mut output, &base, weights.weight(reference));
            for &index in rest {
                let raw = load(index)?;
                ensure_same_shape(tracking.dim(), raw.dim())?;
                accumulate(&mut output, &corrected(index, raw), weights.weight(index));
            }
            Ok(output)
        }
        None => {
            let mut output = base;
            for &index in rest {
                let raw = load(index)?;
                ensure_same_shape(tracking.dim(), raw.dim())?;
                let values = corrected(index, raw);
                let value = index as u8;
                Zip::from(&mut output)
                    .and(&values)
                    .and(tracking)
                    .for_each(|o, &v, &t| {
                        if t == value {
                            *o = v;
                        }
                    });
            }
            Ok(output)
        }
    }
}

fn accumulate(output: &mut Array2<f32>, values: &Array2<f32>, weight: Option<&Array2<f32>>) {
    if let Some(weight) = weight {
        Zip::from(output)
            .and(values)
            .and(weight)
            .for_each(|o, &v, &w| *o += v * w);
    }
}

/// Optional median smoothing, then rounding into the output integer range.
pub fn finish_band(blended: &Array2<f32>, noise_reduction: bool) -> Array2<u16> {
    let to_u16 = |v: f32| v.round().clamp(0.0, u16::MAX as f32) as u16;
    if noise_reduction {
        median_filter_3x3(blended).mapv(to_u16)
    } else {
        blended.mapv(to_u16)
    }
}
