use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};
use crate::morphology::build_rows;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Categorical layers (classification, tracking).
    Nearest,
    /// Reflectance upsampling.
    Bilinear,
    /// Block mean, for reflectance downsampling.
    Average,
}

/// Brings rasters of another resolution onto a target grid of the same extent.
pub trait Resampler {
    fn resample(
        &self,
        data: &Array2<f32>,
        shape: (usize, usize),
        method: Interpolation,
    ) -> Result<Array2<f32>>;

    /// Nearest-neighbour resampling of a categorical raster.
    fn resample_categorical(&self, data: &Array2<u8>, shape: (usize, usize)) -> Result<Array2<u8>> {
        let values = data.mapv(f32::from);
        let resampled = self.resample(&values, shape, Interpolation::Nearest)?;
        Ok(resampled.mapv(|v| v as u8))
    }
}

/// Resampling by pixel-centre mapping between two grids covering the same extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridResampler;

impl Resampler for GridResampler {
    fn resample(
        &self,
        data: &Array2<f32>,
        shape: (usize, usize),
        method: Interpolation,
    ) -> Result<Array2<f32>> {
        let (sh, sw) = data.dim();
        let (th, tw) = shape;
        if sh == 0 || sw == 0 || th == 0 || tw == 0 {
            return Err(MosaicError::UnsupportedRaster(format!(
                "cannot resample {sh}x{sw} to {th}x{tw}"
            )));
        }
        if (sh, sw) == shape {
            return Ok(data.clone());
        }
        let scale_y = sh as f64 / th as f64;
        let scale_x = sw as f64 / tw as f64;

        let out = match method {
            Interpolation::Nearest => build_rows(th, tw, |row| {
                let sy = (((row as f64 + 0.5) * scale_y) as usize).min(sh - 1);
                (0..tw)
                    .map(|col| {
                        let sx = (((col as f64 + 0.5) * scale_x) as usize).min(sw - 1);
                        data[[sy, sx]]
                    })
                    .collect()
            }),
            Interpolation::Bilinear => build_rows(th, tw, |row| {
                let y = ((row as f64 + 0.5) * scale_y - 0.5).clamp(0.0, (sh - 1) as f64);
                (0..tw)
                    .map(|col| {
                        let x = ((col as f64 + 0.5) * scale_x - 0.5).clamp(0.0, (sw - 1) as f64);
                        bilinear_sample(data, y, x)
                    })
                    .collect()
            }),
            Interpolation::Average => build_rows(th, tw, |row| {
                let (y0, y1) = block_span(row, scale_y, sh);
                (0..tw)
                    .map(|col| {
                        let (x0, x1) = block_span(col, scale_x, sw);
                        let block = data.slice(ndarray::s![y0..y1, x0..x1]);
                        block.sum() / block.len() as f32
                    })
                    .collect()
            }),
        };
        Ok(out)
    }
}

/// Source index range covered by target pixel `index`; never empty.
fn block_span(index: usize, scale: f64, len: usize) -> (usize, usize) {
    let start = ((index as f64 * scale).floor() as usize).min(len - 1);
    let end = (((index + 1) as f64 * scale).ceil() as usize).clamp(start + 1, len);
    (start, end)
}

/// Bilinear interpolation at fractional `(y, x)`, with edge clamping.
pub fn bilinear_sample(data: &Array2<f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let v00 = data[[y0, x0]];
    let v10 = data[[y0, x1]];
    let v01 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
}
