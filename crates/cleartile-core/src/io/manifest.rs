use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::acquisition::{Acquisition, AcquisitionPaths, InvalidBreakdown};
use crate::band::{Band, BandTable};
use crate::error::{MosaicError, Result};

/// Supplies validated acquisition metadata.
pub trait MetadataSource {
    /// All acquisitions, validated: required fields present, every band path
    /// given, and a single tile.
    fn acquisitions(&self) -> Result<Vec<Acquisition>>;
}

/// Acquisition list read from a TOML manifest.
///
/// ```toml
/// [[acquisition]]
/// id = "S2A_20210601"
/// tile = "32VNH"
/// timestamp = "2021-06-01T10:30:21Z"
/// invalid_percentage = 12.5
/// scl = "20210601/SCL_20m.tif"
/// aerosol = "20210601/B01_20m.tif"
/// blue = "20210601/B02_20m.tif"
///
/// [acquisition.bands]
/// B02 = "20210601/B02_10m.tif"
/// B03 = "20210601/B03_10m.tif"
/// B04 = "20210601/B04_10m.tif"
/// B08 = "20210601/B08_10m.tif"
/// ```
///
/// `invalid_percentage` may be replaced by an `[acquisition.invalid]` table of
/// per-class percentages. Relative paths resolve against the manifest directory.
#[derive(Clone, Debug)]
pub struct ManifestSource {
    path: PathBuf,
    check_files: bool,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            check_files: true,
        }
    }

    /// Skip the on-disk existence check of raster paths.
    pub fn without_file_check(mut self) -> Self {
        self.check_files = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for ManifestSource {
    fn acquisitions(&self) -> Result<Vec<Acquisition>> {
        let text = std::fs::read_to_string(&self.path)?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        let acquisitions = parse_manifest(&text, base)?;
        if self.check_files {
            ensure_files_exist(&acquisitions)?;
        }
        info!(
            count = acquisitions.len(),
            manifest = %self.path.display(),
            "Loaded acquisition manifest"
        );
        Ok(acquisitions)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    acquisition: Vec<RawAcquisition>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAcquisition {
    id: Option<String>,
    tile: Option<String>,
    timestamp: Option<String>,
    invalid_percentage: Option<f64>,
    invalid: Option<InvalidBreakdown>,
    scl: Option<PathBuf>,
    aerosol: Option<PathBuf>,
    blue: Option<PathBuf>,
    #[serde(default)]
    bands: RawBands,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBands {
    #[serde(rename = "B02")]
    b02: Option<PathBuf>,
    #[serde(rename = "B03")]
    b03: Option<PathBuf>,
    #[serde(rename = "B04")]
    b04: Option<PathBuf>,
    #[serde(rename = "B08")]
    b08: Option<PathBuf>,
}

impl RawBands {
    fn get(&self, band: Band) -> Option<&PathBuf> {
        match band {
            Band::B02 => self.b02.as_ref(),
            Band::B03 => self.b03.as_ref(),
            Band::B04 => self.b04.as_ref(),
            Band::B08 => self.b08.as_ref(),
        }
    }
}

/// Parse and validate manifest text. Does not touch the raster files.
pub fn parse_manifest(text: &str, base: &Path) -> Result<Vec<Acquisition>> {
    let raw: RawManifest = toml::from_str(text).map_err(|e| MosaicError::Manifest(e.to_string()))?;
    if raw.acquisition.is_empty() {
        return Err(MosaicError::EmptySequence);
    }

    let acquisitions = raw
        .acquisition
        .into_iter()
        .enumerate()
        .map(|(n, entry)| validate_entry(n, entry, base))
        .collect::<Result<Vec<_>>>()?;
    ensure_single_tile(&acquisitions)?;
    Ok(acquisitions)
}

fn validate_entry(n: usize, entry: RawAcquisition, base: &Path) -> Result<Acquisition> {
    let id = entry.id.ok_or_else(|| MosaicError::MissingField {
        acquisition: format!("#{}", n + 1),
        field: "id".into(),
    })?;
    let missing = |field: &str| MosaicError::MissingField {
        acquisition: id.clone(),
        field: field.into(),
    };

    let stamp = entry.timestamp.as_deref().ok_or_else(|| missing("timestamp"))?;
    let timestamp = DateTime::parse_from_rfc3339(stamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| MosaicError::Manifest(format!("{id}: bad timestamp {stamp:?}: {e}")))?;

    let invalid_percentage = match (entry.invalid_percentage, &entry.invalid) {
        (Some(p), _) => p,
        (None, Some(breakdown)) => breakdown.invalid_percentage(),
        (None, None) => return Err(missing("invalid_percentage")),
    };
    if !(0.0..=100.0).contains(&invalid_percentage) {
        return Err(MosaicError::Manifest(format!(
            "{id}: invalid percentage {invalid_percentage} outside 0..100"
        )));
    }

    let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
    let scl = entry.scl.map(&resolve).ok_or_else(|| missing("scl"))?;
    let aerosol = entry.aerosol.map(&resolve).ok_or_else(|| missing("aerosol"))?;
    let blue = entry.blue.map(&resolve).ok_or_else(|| missing("blue"))?;
    let bands = BandTable::try_from_fn(|band| {
        entry
            .bands
            .get(band)
            .cloned()
            .map(&resolve)
            .ok_or_else(|| MosaicError::MissingBand {
                acquisition: id.clone(),
                band: band.to_string(),
            })
    })?;

    debug!(%id, %timestamp, invalid_percentage, "Validated acquisition");
    Ok(Acquisition {
        id,
        tile: entry.tile,
        timestamp,
        invalid_percentage,
        paths: AcquisitionPaths {
            scl,
            aerosol,
            blue,
            bands,
        },
    })
}

/// All acquisitions that name a tile must name the same one.
pub fn ensure_single_tile(acquisitions: &[Acquisition]) -> Result<()> {
    let mut tiles = acquisitions.iter().filter_map(|a| a.tile.as_deref());
    if let Some(expected) = tiles.next() {
        if let Some(found) = tiles.find(|t| *t != expected) {
            return Err(MosaicError::MixedTiles {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

/// Every raster path of every acquisition must exist on disk.
pub fn ensure_files_exist(acquisitions: &[Acquisition]) -> Result<()> {
    for acq in acquisitions {
        let paths = &acq.paths;
        let fixed = [("scl", &paths.scl), ("aerosol", &paths.aerosol), ("blue", &paths.blue)];
        for (field, path) in fixed {
            if !path.is_file() {
                return Err(MosaicError::MissingField {
                    acquisition: acq.id.clone(),
                    field: format!("{field} ({} not found)", path.display()),
                });
            }
        }
        for (band, path) in paths.bands.iter() {
            if !path.is_file() {
                return Err(MosaicError::MissingBand {
                    acquisition: acq.id.clone(),
                    band: format!("{band} ({} not found)", path.display()),
                });
            }
        }
    }
    Ok(())
}
