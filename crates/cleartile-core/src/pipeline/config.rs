use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blend::BlendConfig;
use crate::composite::CompositorConfig;
use crate::error::{MosaicError, Result};
use crate::harmonize::HarmonizationConfig;
use crate::quality::QualityParams;
use crate::ranking::RankingParams;

/// Largest ranking position a tracking array can store; 255 stays unused.
pub const MAX_SEARCH_IMAGES: usize = 254;

/// Every tunable of one mosaic build.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub quality: QualityParams,
    pub ranking: RankingParams,
    pub compositor: CompositorConfig,
    pub harmonization: HarmonizationConfig,
    pub blend: BlendConfig,
}

impl MosaicConfig {
    pub fn validate(&self) -> Result<()> {
        let c = &self.compositor;
        if !(0.0..=100.0).contains(&c.ideal_percent) {
            return Err(invalid(format!(
                "ideal_percent {} outside 0..100",
                c.ideal_percent
            )));
        }
        if c.max_days < 0 {
            return Err(invalid(format!("max_days {} is negative", c.max_days)));
        }
        if c.max_images_include == 0 {
            return Err(invalid("max_images_include must be at least 1".into()));
        }
        if c.max_search_images > MAX_SEARCH_IMAGES {
            return Err(invalid(format!(
                "max_search_images {} exceeds {MAX_SEARCH_IMAGES}",
                c.max_search_images
            )));
        }
        if c.threshold_scale <= 0.0 || c.threshold_decay <= 0.0 {
            return Err(invalid(
                "threshold_scale and threshold_decay must be positive".into(),
            ));
        }

        let q = &self.quality;
        if q.haze_low > q.haze_high {
            return Err(invalid(format!(
                "haze_low {} above haze_high {}",
                q.haze_low, q.haze_high
            )));
        }
        if q.blur_window == 0 {
            return Err(invalid("blur_window must be at least 1".into()));
        }
        if q.haze_ratio < 1.0 {
            return Err(invalid(format!("haze_ratio {} below 1", q.haze_ratio)));
        }
        if q.distance_cap <= 0.0 {
            return Err(invalid("distance_cap must be positive".into()));
        }

        if self.ranking.coarse_factor == 0 {
            return Err(invalid("coarse_factor must be at least 1".into()));
        }
        if self.ranking.tie_window < 0.0 {
            return Err(invalid("tie_window is negative".into()));
        }
        if self.blend.feather_distance < 0.0 {
            return Err(invalid("feather_distance is negative".into()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> MosaicError {
    MosaicError::InvalidConfig(message)
}

/// Inputs, outputs and settings of a mosaic run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Acquisition manifest (TOML).
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    /// Suffix of every output file name.
    pub name: String,
    pub mosaic: MosaicConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("manifest.toml"),
            output_dir: PathBuf::from("output"),
            name: "mosaic".into(),
            mosaic: MosaicConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(invalid("output name is empty".into()));
        }
        self.mosaic.validate()
    }

    /// `<output_dir>/<prefix>_<name>.tif`
    pub fn output_path(&self, prefix: &str) -> PathBuf {
        self.output_dir.join(format!("{prefix}_{}.tif", self.name))
    }
}
