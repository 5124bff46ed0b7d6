use ndarray::{Array2, Zip};

use crate::consts::{MAX_QUALITY, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{ensure_same_shape, Result};
use crate::scene::SceneClass;

use super::QualityParams;

/// Result of [`spatial_quality`].
#[derive(Clone, Debug)]
pub enum SpatialQuality {
    Map(Array2<u8>),
    Scalar(f64),
}

/// Refine a point-wise quality map with spatial context.
///
/// `good_depth` is, for every pixel, its distance into the surrounding area of
/// good mean quality (0 outside such areas). `eroded_quality` is the quality
/// map after grey erosion. Non-water pixels that are shallow inside a good area
/// and sit above their eroded value are pulled halfway down to it, which
/// removes small islands of apparent good data inside contamination.
///
/// With `want_scalar` the refined map is reduced to a 0..100 usability score
/// for the whole acquisition: half from the mean refined quality, half from
/// the mean (capped) depth.
pub fn spatial_quality(
    scl: &Array2<u8>,
    quality: &Array2<u8>,
    good_depth: &Array2<f32>,
    eroded_quality: &Array2<u8>,
    params: &QualityParams,
    want_scalar: bool,
) -> Result<SpatialQuality> {
    let dim = quality.dim();
    ensure_same_shape(dim, scl.dim())?;
    ensure_same_shape(dim, good_depth.dim())?;
    ensure_same_shape(dim, eroded_quality.dim())?;

    let island_distance = params.island_distance;
    let zip = Zip::from(scl).and(quality).and(good_depth).and(eroded_quality);
    let pixel = |&s: &u8, &q: &u8, &d: &f32, &e: &u8| -> u8 {
        if e < q && d < island_distance && SceneClass::from_code(s) != SceneClass::Water {
            ((q as u16 + e as u16) / 2) as u8
        } else {
            q
        }
    };
    let refined = if dim.0 * dim.1 >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(pixel)
    } else {
        zip.map_collect(pixel)
    };

    if !want_scalar {
        return Ok(SpatialQuality::Map(refined));
    }
    Ok(SpatialQuality::Scalar(scalar_score(
        &refined,
        good_depth,
        params.distance_cap,
    )))
}

fn scalar_score(refined: &Array2<u8>, good_depth: &Array2<f32>, cap: f32) -> f64 {
    let n = refined.len();
    if n == 0 {
        return 0.0;
    }
    let quality_sum: u64 = refined.iter().map(|&q| q as u64).sum();
    let quality_term = quality_sum as f64 / (n as f64 * MAX_QUALITY as f64);

    let depth_term = if cap > 0.0 {
        let depth_sum: f64 = good_depth
            .iter()
            .map(|&d| (d.min(cap) / cap) as f64)
            .sum();
        depth_sum / n as f64
    } else {
        0.0
    };

    50.0 * quality_term + 50.0 * depth_term
}
