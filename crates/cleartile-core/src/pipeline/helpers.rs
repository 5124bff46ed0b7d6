use std::path::Path;

use ndarray::Array2;

use crate::acquisition::{Acquisition, AcquisitionLayers};
use crate::band::Band;
use crate::error::Result;
use crate::io::raster::{from_f32, to_f32};
use crate::io::{Interpolation, RasterSource, Resampler};

/// Bring a reflectance raster onto `shape`: block mean when shrinking,
/// bilinear otherwise.
pub(super) fn fit_reflectance(
    data: &Array2<f32>,
    shape: (usize, usize),
    resampler: &dyn Resampler,
) -> Result<Array2<f32>> {
    let (h, w) = data.dim();
    let method = if h > shape.0 || w > shape.1 {
        Interpolation::Average
    } else {
        Interpolation::Bilinear
    };
    resampler.resample(data, shape, method)
}

pub(super) fn read_reflectance(
    path: &Path,
    shape: (usize, usize),
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
) -> Result<Array2<f32>> {
    let data = to_f32(&raster.read(path)?);
    fit_reflectance(&data, shape, resampler)
}

/// Scoring layers on the working grid, which is the grid of the SCL raster.
pub(super) fn load_layers(
    acquisition: &Acquisition,
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
) -> Result<AcquisitionLayers> {
    let scl = raster.read_u8(&acquisition.paths.scl)?;
    let shape = scl.dim();
    let band_a = read_reflectance(&acquisition.paths.aerosol, shape, raster, resampler)?;
    let band_b = read_reflectance(&acquisition.paths.blue, shape, raster, resampler)?;
    AcquisitionLayers::new(scl, from_f32(&band_a), from_f32(&band_b))
}

/// Downsample scoring layers by `factor` for cheap reference scoring.
pub(super) fn coarsen_layers(
    layers: &AcquisitionLayers,
    factor: usize,
    resampler: &dyn Resampler,
) -> Result<AcquisitionLayers> {
    if factor <= 1 {
        return Ok(layers.clone());
    }
    let (h, w) = layers.dim();
    let shape = ((h / factor).max(1), (w / factor).max(1));
    let scl = resampler.resample_categorical(&layers.scl, shape)?;
    let band_a = resampler.resample(&to_f32(&layers.band_a), shape, Interpolation::Average)?;
    let band_b = resampler.resample(&to_f32(&layers.band_b), shape, Interpolation::Average)?;
    AcquisitionLayers::new(scl, from_f32(&band_a), from_f32(&band_b))
}

/// One output band of an acquisition, fitted to `shape`.
pub(super) fn load_band(
    acquisition: &Acquisition,
    band: Band,
    shape: (usize, usize),
    raster: &dyn RasterSource,
    resampler: &dyn Resampler,
) -> Result<Array2<f32>> {
    read_reflectance(acquisition.paths.bands.get(band), shape, raster, resampler)
}
