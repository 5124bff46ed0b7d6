use ndarray::{Array2, Zip};

use crate::consts::{GOOD_QUALITY, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{ensure_same_shape, Result};
use crate::scene::SceneClass;

use super::QualityParams;

/// Score one pixel from its class and auxiliary reflectances.
///
/// `band_a` is the aerosol band (haze), `band_b` the blue band (bright ground
/// vs. cloud). `near_nodata` marks pixels inside the dilated nodata mask.
pub fn score_pixel(
    class: SceneClass,
    band_a: u16,
    band_b: u16,
    near_nodata: bool,
    params: &QualityParams,
) -> u8 {
    let hazy = band_a > params.haze_high;
    let slightly_hazy = band_a > params.haze_low;
    let bright_ground = band_b < params.bright_blue;

    let score: u8 = match class {
        SceneClass::NoData | SceneClass::SaturatedDefective => return 0,
        SceneClass::DarkFeatureShadow => 5,
        SceneClass::CloudShadow => 3,
        SceneClass::Vegetation | SceneClass::NotVegetated => {
            if hazy {
                8
            } else if slightly_hazy {
                9
            } else {
                10
            }
        }
        SceneClass::Water => {
            if hazy {
                8
            } else {
                9
            }
        }
        SceneClass::Unclassified => {
            if hazy {
                7
            } else {
                8
            }
        }
        SceneClass::CloudMediumProbability => {
            if bright_ground {
                6
            } else {
                2
            }
        }
        SceneClass::CloudHighProbability => {
            if bright_ground {
                4
            } else {
                1
            }
        }
        SceneClass::ThinCirrus => {
            if hazy {
                4
            } else {
                6
            }
        }
        SceneClass::SnowIce => {
            if bright_ground {
                5
            } else {
                4
            }
        }
    };

    if near_nodata {
        score.saturating_sub(1)
    } else {
        score
    }
}

/// Point-wise quality map of an acquisition.
///
/// `dilated_nodata` must already be grown by the caller; inputs are not modified.
pub fn score(
    scl: &Array2<u8>,
    band_a: &Array2<u16>,
    band_b: &Array2<u16>,
    dilated_nodata: &Array2<bool>,
    params: &QualityParams,
) -> Result<Array2<u8>> {
    ensure_same_shape(scl.dim(), band_a.dim())?;
    ensure_same_shape(scl.dim(), band_b.dim())?;
    ensure_same_shape(scl.dim(), dilated_nodata.dim())?;

    let zip = Zip::from(scl).and(band_a).and(band_b).and(dilated_nodata);
    let pixel = |&s: &u8, &a: &u16, &b: &u16, &n: &bool| {
        score_pixel(SceneClass::from_code(s), a, b, n, params)
    };

    Ok(if scl.len() >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(pixel)
    } else {
        zip.map_collect(pixel)
    })
}

/// Per-pixel haze delta of a candidate against the current selection.
///
/// `+1` where the candidate's aerosol band shows new haze over a pixel both
/// acquisitions consider good, `-1` where the candidate is the clearer one,
/// `0` otherwise.
pub fn haze_delta(
    ref_quality: &Array2<u8>,
    ref_band_a: &Array2<u16>,
    cand_quality: &Array2<u8>,
    cand_band_a: &Array2<u16>,
    params: &QualityParams,
) -> Result<Array2<i8>> {
    let dim = ref_quality.dim();
    ensure_same_shape(dim, ref_band_a.dim())?;
    ensure_same_shape(dim, cand_quality.dim())?;
    ensure_same_shape(dim, cand_band_a.dim())?;

    let ratio = params.haze_ratio;
    let margin = params.haze_margin as f32;
    let zip = Zip::from(ref_quality)
        .and(ref_band_a)
        .and(cand_quality)
        .and(cand_band_a);
    let pixel = |&rq: &u8, &ra: &u16, &cq: &u8, &ca: &u16| -> i8 {
        if rq < GOOD_QUALITY || cq < GOOD_QUALITY {
            return 0;
        }
        let (ra, ca) = (ra as f32, ca as f32);
        if ca > ra * ratio && ca - ra > margin {
            1
        } else if ra > ca * ratio && ra - ca > margin {
            -1
        } else {
            0
        }
    };

    Ok(if dim.0 * dim.1 >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(pixel)
    } else {
        zip.map_collect(pixel)
    })
}
