use thiserror::Error;

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Acquisition {acquisition}: missing path for band {band}")]
    MissingBand { acquisition: String, band: String },

    #[error("Acquisition {acquisition}: missing metadata field {field}")]
    MissingField { acquisition: String, field: String },

    #[error("Multiple tiles in acquisition set: {expected}, {found}")]
    MixedTiles { expected: String, found: String },

    #[error("Degenerate statistics for band {band}: no usable pixels in any acquisition")]
    DegenerateStatistics { band: String },

    #[error("Raster shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Unsupported raster: {0}")]
    UnsupportedRaster(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty acquisition set")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, MosaicError>;

/// Fail with [`MosaicError::ShapeMismatch`] unless both shapes agree.
pub fn ensure_same_shape(expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(MosaicError::ShapeMismatch { expected, found })
    }
}
