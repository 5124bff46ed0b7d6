use ndarray::{Array2, Zip};

use crate::consts::MAD_TO_STD;

/// Robust location and scale of one band sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandStatistics {
    pub median: f64,
    /// Median absolute deviation scaled to a standard-deviation estimate.
    pub madstd: f64,
}

impl BandStatistics {
    /// A zero median or scale cannot anchor a correction.
    pub fn is_degenerate(&self) -> bool {
        self.median <= 0.0 || self.madstd <= 0.0
    }
}

/// Median of `values`; the two middle values are averaged for even counts.
///
/// Reorders `values`. Returns `None` for an empty slice.
pub fn median(values: &mut [f32]) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let upper = *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1 as f64;
    if n % 2 == 1 {
        return Some(upper);
    }
    let lower = values[..mid]
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    Some((lower + upper) / 2.0)
}

/// Median and scaled MAD of `values`. Reorders `values`.
pub fn robust_statistics(values: &mut [f32]) -> Option<BandStatistics> {
    let med = median(values)?;
    let mut deviations: Vec<f32> = values.iter().map(|&v| (v as f64 - med).abs() as f32).collect();
    let mad = median(&mut deviations)?;
    Some(BandStatistics {
        median: med,
        madstd: mad * MAD_TO_STD,
    })
}

/// Statistics of the non-zero pixels of `band` selected by `mask`.
///
/// Zero is the band's nodata value and never enters a sample. `None` as mask
/// selects every pixel. Returns `None` when the sample is empty.
pub fn masked_statistics(band: &Array2<f32>, mask: Option<&Array2<bool>>) -> Option<BandStatistics> {
    let mut sample: Vec<f32> = match mask {
        Some(mask) => {
            let mut sample = Vec::new();
            Zip::from(band).and(mask).for_each(|&v, &m| {
                if m && v != 0.0 {
                    sample.push(v);
                }
            });
            sample
        }
        None => band.iter().copied().filter(|&v| v != 0.0).collect(),
    };
    robust_statistics(&mut sample)
}
