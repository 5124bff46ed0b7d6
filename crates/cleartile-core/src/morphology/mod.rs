//! Array-transform kernels: distance transform, disk morphology and the
//! small local filters applied to tracking arrays and blended bands.

pub mod binary;
pub mod distance;
pub mod filters;

use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Build an `h x w` array row by row, in parallel for large rasters.
///
/// Rows are produced independently and written back in row order, so the
/// result does not depend on scheduling.
pub(crate) fn build_rows<T, F>(h: usize, w: usize, row_fn: F) -> Array2<T>
where
    T: Clone + Default + Send,
    F: Fn(usize) -> Vec<T> + Sync,
{
    let rows: Vec<Vec<T>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(&row_fn).collect()
    } else {
        (0..h).map(&row_fn).collect()
    };

    let mut result = Array2::<T>::default((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Offsets `(dr, dc)` of every pixel whose centre lies within `radius` of the origin.
pub(crate) fn disk_offsets(radius: usize) -> Vec<(isize, isize)> {
    let r = radius as isize;
    let limit = (radius * radius) as isize;
    let mut offsets = Vec::new();
    for dr in -r..=r {
        for dc in -r..=r {
            if dr * dr + dc * dc <= limit {
                offsets.push((dr, dc));
            }
        }
    }
    offsets
}
