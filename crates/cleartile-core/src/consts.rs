/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Highest value a quality score can take.
pub const MAX_QUALITY: u8 = 10;

/// Quality at or above which a pixel counts as "good" for distance fields
/// and haze comparison.
pub const GOOD_QUALITY: u8 = 8;

/// Scale factor of the acceptance threshold `C1 * exp(-C2 * q)`.
pub const DEFAULT_THRESHOLD_SCALE: f64 = 2.0012;

/// Decay rate of the acceptance threshold `C1 * exp(-C2 * q)`.
pub const DEFAULT_THRESHOLD_DECAY: f64 = 0.028135;

/// Consistency constant turning a median absolute deviation into a
/// standard-deviation estimate for normally distributed data.
pub const MAD_TO_STD: f64 = 1.4826;

/// Seconds per day, for converting acquisition age windows.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Reflectance (L2A digital numbers) of the aerosol band above which a clear
/// pixel is treated as lightly hazy.
pub const DEFAULT_HAZE_LOW: u16 = 1500;

/// Reflectance of the aerosol band above which a pixel is treated as hazy.
pub const DEFAULT_HAZE_HIGH: u16 = 2500;

/// Blue reflectance below which a "cloud" pixel is more likely bright ground.
pub const DEFAULT_BRIGHT_BLUE: u16 = 2000;

/// Relative aerosol-band increase that flags new haze between two acquisitions.
pub const DEFAULT_HAZE_RATIO: f32 = 1.25;

/// Absolute aerosol-band increase (digital numbers) that flags new haze.
pub const DEFAULT_HAZE_MARGIN: u16 = 100;

/// Nodata dilation radius in working-resolution pixels (1 km at 20 m).
pub const DEFAULT_NODATA_DILATION_RADIUS: usize = 50;

/// Grey erosion radius used to find isolated islands of good quality.
pub const DEFAULT_EROSION_RADIUS: usize = 50;

/// Box window for the mean quality that feeds the distance-to-good field.
pub const DEFAULT_BLUR_WINDOW: usize = 61;

/// Percentage-point window around the lowest invalid percentage inside which
/// candidates compete for the reference slot on their scalar quality.
pub const DEFAULT_TIE_WINDOW: f64 = 10.0;

/// Downsampling factor of the coarse grid used for scalar tie-break scoring.
pub const DEFAULT_COARSE_FACTOR: usize = 3;

/// Fraction of the tile an acquisition must own before it contributes strata
/// counts to stratified harmonization.
pub const STRATIFIED_MIN_COVER: f64 = 0.005;
