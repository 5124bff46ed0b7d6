use ndarray::Array2;
use tracing::debug;

use crate::acquisition::{AcquisitionLayers, QualityMap};
use crate::consts::GOOD_QUALITY;
use crate::error::Result;
use crate::morphology::binary::{dilate_disk, grey_erode_disk};
use crate::morphology::distance::distance_to_false;
use crate::morphology::filters::box_mean;
use crate::scene::SceneClass;

use super::radiometric::score;
use super::spatial::{spatial_quality, SpatialQuality};
use super::QualityParams;

/// Full quality map of an acquisition, spatially refined.
pub fn assess_quality(layers: &AcquisitionLayers, params: &QualityParams) -> Result<QualityMap> {
    match assess(layers, params, 1.0, false)? {
        SpatialQuality::Map(map) => Ok(map),
        SpatialQuality::Scalar(_) => unreachable!("map requested"),
    }
}

/// Scalar 0..100 usability of an acquisition, used for ranking.
///
/// `distance_scale` converts pixel distances of a coarse grid back to
/// working-resolution pixels.
pub fn assess_scalar(
    layers: &AcquisitionLayers,
    params: &QualityParams,
    distance_scale: f32,
) -> Result<f64> {
    match assess(layers, params, distance_scale, true)? {
        SpatialQuality::Scalar(score) => Ok(score),
        SpatialQuality::Map(_) => unreachable!("scalar requested"),
    }
}

fn assess(
    layers: &AcquisitionLayers,
    params: &QualityParams,
    distance_scale: f32,
    want_scalar: bool,
) -> Result<SpatialQuality> {
    let nodata = layers
        .scl
        .mapv(|code| SceneClass::from_code(code) == SceneClass::NoData);
    let nodata_dilated = dilate_disk(&nodata, params.nodata_dilation_radius);

    let quality = score(
        &layers.scl,
        &layers.band_a,
        &layers.band_b,
        &nodata_dilated,
        params,
    )?;

    let eroded = grey_erode_disk(&quality, params.erosion_radius);
    let good_depth = good_depth(&quality, params.blur_window, distance_scale);
    debug!(
        rows = quality.nrows(),
        cols = quality.ncols(),
        want_scalar,
        "Scored acquisition"
    );

    spatial_quality(
        &layers.scl,
        &quality,
        &good_depth,
        &eroded,
        params,
        want_scalar,
    )
}

/// Distance of every pixel into the area whose local mean quality is good.
fn good_depth(quality: &Array2<u8>, window: usize, distance_scale: f32) -> Array2<f32> {
    let mean = box_mean(&quality.mapv(|q| q as f32), window);
    let good = mean.mapv(|m| m > GOOD_QUALITY as f32);
    let mut depth = distance_to_false(&good);
    if distance_scale != 1.0 {
        depth.mapv_inplace(|d| d * distance_scale);
    }
    depth
}
