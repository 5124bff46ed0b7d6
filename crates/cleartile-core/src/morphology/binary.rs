use ndarray::Array2;

use crate::consts::MAX_QUALITY;

use super::distance::distance_to_false;

/// Binary dilation with a disk of `radius` pixels.
///
/// A pixel becomes true if any true pixel lies within `radius` of it.
pub fn dilate_disk(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    if radius == 0 {
        return mask.clone();
    }
    let inverted = mask.mapv(|v| !v);
    let limit = radius as f32;
    distance_to_false(&inverted).mapv(|d| d <= limit)
}

/// Binary erosion with a disk of `radius` pixels.
///
/// A pixel stays true only if every pixel within `radius` of it is true.
/// The raster border does not erode.
pub fn erode_disk(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    if radius == 0 {
        return mask.clone();
    }
    let limit = radius as f32;
    distance_to_false(mask).mapv(|d| d > limit)
}

/// Grey-level erosion of a quality map with a disk of `radius` pixels.
///
/// Equivalent to a minimum filter over the disk. Computed as a stack of binary
/// erosions of the nested level sets `quality >= l`.
pub fn grey_erode_disk(quality: &Array2<u8>, radius: usize) -> Array2<u8> {
    if radius == 0 {
        return quality.clone();
    }
    let mut result = Array2::<u8>::zeros(quality.dim());
    for level in 1..=MAX_QUALITY {
        let level_set = quality.mapv(|q| q >= level);
        if !level_set.iter().any(|&v| v) {
            break;
        }
        let eroded = if level_set.iter().all(|&v| v) {
            level_set
        } else {
            erode_disk(&level_set, radius)
        };
        result.zip_mut_with(&eroded, |r, &keep| {
            if keep {
                *r = level;
            }
        });
    }
    result
}
