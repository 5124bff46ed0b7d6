use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::Array2;
use num_traits::{Bounded, NumCast, ToPrimitive};

use crate::error::{MosaicError, Result};

/// Reads and writes single-band rasters on a shared pixel grid.
pub trait RasterSource {
    fn read(&self, path: &Path) -> Result<Array2<u16>>;

    fn write_u16(&self, data: &Array2<u16>, path: &Path) -> Result<()>;

    fn write_u8(&self, data: &Array2<u8>, path: &Path) -> Result<()>;

    /// `(rows, cols)` of a raster.
    fn dimensions(&self, path: &Path) -> Result<(usize, usize)> {
        Ok(self.read(path)?.dim())
    }

    /// Read a categorical raster. Values above 255 are rejected.
    fn read_u8(&self, path: &Path) -> Result<Array2<u8>> {
        let data = self.read(path)?;
        if data.iter().any(|&v| v > u8::MAX as u16) {
            return Err(MosaicError::UnsupportedRaster(format!(
                "{}: values exceed 8 bits",
                path.display()
            )));
        }
        Ok(data.mapv(|v| v as u8))
    }
}

/// Convert any numeric raster to `f32`; unrepresentable values become 0.
pub fn to_f32<T: Copy + ToPrimitive>(data: &Array2<T>) -> Array2<f32> {
    data.mapv(|v| v.to_f32().unwrap_or(0.0))
}

/// Round and saturate an `f32` raster into `T`.
pub fn from_f32<T: Copy + NumCast + Bounded>(data: &Array2<f32>) -> Array2<T> {
    let lo = T::min_value().to_f32().unwrap_or(0.0);
    let hi = T::max_value().to_f32().unwrap_or(0.0);
    data.mapv(|v| {
        let clamped = if v.is_nan() { lo } else { v.round().clamp(lo, hi) };
        NumCast::from(clamped).unwrap_or_else(T::min_value)
    })
}

/// 8/16-bit single-channel rasters via the `image` crate, raw values.
///
/// The output format follows the file extension (TIFF for `.tif`).
#[derive(Clone, Copy, Debug, Default)]
pub struct TiffRaster;

impl RasterSource for TiffRaster {
    fn dimensions(&self, path: &Path) -> Result<(usize, usize)> {
        let (w, h) = image::image_dimensions(path)?;
        Ok((h as usize, w as usize))
    }

    fn read(&self, path: &Path) -> Result<Array2<u16>> {
        let img = image::open(path)?;
        let (w, h) = (img.width() as usize, img.height() as usize);
        let values: Vec<u16> = match img {
            DynamicImage::ImageLuma8(buf) => buf.into_raw().into_iter().map(<u16 as From<u8>>::from).collect(),
            DynamicImage::ImageLuma16(buf) => buf.into_raw(),
            other => {
                return Err(MosaicError::UnsupportedRaster(format!(
                    "{}: expected a single 8 or 16-bit band, found {:?}",
                    path.display(),
                    other.color()
                )))
            }
        };
        Array2::from_shape_vec((h, w), values)
            .map_err(|e| MosaicError::UnsupportedRaster(format!("{}: {e}", path.display())))
    }

    fn write_u16(&self, data: &Array2<u16>, path: &Path) -> Result<()> {
        let (h, w) = data.dim();
        let pixels: Vec<u16> = data.iter().copied().collect();
        let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| MosaicError::UnsupportedRaster(format!("{}: bad buffer", path.display())))?;
        ensure_parent(path)?;
        img.save(path)?;
        Ok(())
    }

    fn write_u8(&self, data: &Array2<u8>, path: &Path) -> Result<()> {
        let (h, w) = data.dim();
        let pixels: Vec<u8> = data.iter().copied().collect();
        let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| MosaicError::UnsupportedRaster(format!("{}: bad buffer", path.display())))?;
        ensure_parent(path)?;
        img.save(path)?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// In-memory raster store keyed by path.
#[derive(Debug, Default)]
pub struct MemoryRaster {
    rasters: Mutex<HashMap<PathBuf, Array2<u16>>>,
}

impl MemoryRaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, data: Array2<u16>) {
        self.lock().insert(path.into(), data);
    }

    pub fn get(&self, path: &Path) -> Option<Array2<u16>> {
        self.lock().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Array2<u16>>> {
        self.rasters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RasterSource for MemoryRaster {
    fn read(&self, path: &Path) -> Result<Array2<u16>> {
        self.get(path).ok_or_else(|| {
            MosaicError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not in memory store", path.display()),
            ))
        })
    }

    fn write_u16(&self, data: &Array2<u16>, path: &Path) -> Result<()> {
        self.insert(path, data.clone());
        Ok(())
    }

    fn write_u8(&self, data: &Array2<u8>, path: &Path) -> Result<()> {
        self.insert(path, data.mapv(<u16 as From<u8>>::from));
        Ok(())
    }
}
