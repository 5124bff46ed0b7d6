use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Squared-distance stand-in for "no zero pixel on this line". Kept finite so
/// the parabola intersections stay well defined.
const FAR: f64 = 1e20;

/// Exact Euclidean distance from every `true` pixel to the nearest `false` pixel.
///
/// `false` pixels get 0. When the mask has no `false` pixel at all every
/// distance is `f32::INFINITY`. Pixels outside the raster are not considered,
/// so regions touching the border are not eroded by it.
///
/// Separable lower-envelope transform (Felzenszwalb & Huttenlocher):
/// one 1D pass down the columns, one along the rows.
pub fn distance_to_false(mask: &Array2<bool>) -> Array2<f32> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Array2::zeros((h, w));
    }
    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;

    // Column pass.
    let column_pass = |col: usize| -> Vec<f64> {
        let f: Vec<f64> = (0..h)
            .map(|row| if mask[[row, col]] { FAR } else { 0.0 })
            .collect();
        squared_distance_1d(&f)
    };
    let columns: Vec<Vec<f64>> = if parallel {
        (0..w).into_par_iter().map(column_pass).collect()
    } else {
        (0..w).map(column_pass).collect()
    };

    // Row pass over the column results.
    let row_pass = |row: usize| -> Vec<f32> {
        let f: Vec<f64> = (0..w).map(|col| columns[col][row]).collect();
        squared_distance_1d(&f)
            .into_iter()
            .map(|d| {
                if d >= FAR / 2.0 {
                    f32::INFINITY
                } else {
                    d.sqrt() as f32
                }
            })
            .collect()
    };
    let rows: Vec<Vec<f32>> = if parallel {
        (0..h).into_par_iter().map(row_pass).collect()
    } else {
        (0..h).map(row_pass).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

/// Euclidean distance from every pixel to the nearest `true` pixel (0 on `true`).
pub fn distance_to_true(mask: &Array2<bool>) -> Array2<f32> {
    distance_to_false(&mask.mapv(|v| !v))
}

/// 1D squared distance transform of the sampled function `f`.
fn squared_distance_1d(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut d = vec![0.0f64; n];
    if n == 0 {
        return d;
    }

    // Parabola vertices and the boundaries between them.
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let fq = f[q] + (q * q) as f64;
        let mut s = intersection(f, v[k], q, fq);
        while s <= z[k] {
            k -= 1;
            s = intersection(f, v[k], q, fq);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let diff = q as f64 - p as f64;
        *out = diff * diff + f[p];
    }
    d
}

#[inline]
fn intersection(f: &[f64], p: usize, q: usize, fq: f64) -> f64 {
    let fp = f[p] + (p * p) as f64;
    (fq - fp) / (2.0 * (q as f64 - p as f64))
}
