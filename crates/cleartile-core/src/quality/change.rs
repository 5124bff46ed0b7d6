use ndarray::{Array2, Zip};

use crate::consts::{GOOD_QUALITY, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{ensure_same_shape, Result};
use crate::scene::SceneClass;

use super::ChangeMargins;

/// Decide per pixel whether a candidate may overwrite the current selection.
///
/// True when the candidate's quality beats the current one by more than the
/// margin for the candidate's class, or when both are good, equal, and the
/// candidate is the less hazy view of the same land. Never true where
/// `haze_delta` flags new haze.
pub fn change_mask(
    quality_ref: &Array2<u8>,
    quality_candidate: &Array2<u8>,
    scl_ref: &Array2<u8>,
    scl_candidate: &Array2<u8>,
    haze_delta: &Array2<i8>,
    margins: &ChangeMargins,
) -> Result<Array2<bool>> {
    let dim = quality_ref.dim();
    ensure_same_shape(dim, quality_candidate.dim())?;
    ensure_same_shape(dim, scl_ref.dim())?;
    ensure_same_shape(dim, scl_candidate.dim())?;
    ensure_same_shape(dim, haze_delta.dim())?;

    let zip = Zip::from(quality_ref)
        .and(quality_candidate)
        .and(scl_ref)
        .and(scl_candidate)
        .and(haze_delta);
    let pixel = |&rq: &u8, &cq: &u8, &rs: &u8, &cs: &u8, &haze: &i8| -> bool {
        if haze > 0 {
            return false;
        }
        let margin = match SceneClass::from_code(cs) {
            SceneClass::Water => margins.water,
            _ => margins.other,
        };
        if cq as u16 > rq as u16 + margin as u16 {
            return true;
        }
        cq == rq
            && cq >= GOOD_QUALITY
            && haze < 0
            && SceneClass::from_code(rs) != SceneClass::Water
    };

    Ok(if dim.0 * dim.1 >= PARALLEL_PIXEL_THRESHOLD {
        zip.par_map_collect(pixel)
    } else {
        zip.map_collect(pixel)
    })
}
