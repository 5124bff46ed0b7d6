//! External collaborators: raster files, resampling and acquisition metadata.

pub mod manifest;
pub mod raster;
pub mod resample;

pub use manifest::{ManifestSource, MetadataSource};
pub use raster::{MemoryRaster, RasterSource, TiffRaster};
pub use resample::{GridResampler, Interpolation, Resampler};
