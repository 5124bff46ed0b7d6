use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use ndarray::Array2;

use cleartile_core::acquisition::{Acquisition, AcquisitionPaths};
use cleartile_core::band::BandTable;
use cleartile_core::composite::ScoredAcquisition;
use cleartile_core::error::Result;
use cleartile_core::io::{MemoryRaster, MetadataSource};
use cleartile_core::quality::QualityParams;
use cleartile_core::ranking::{RankedAcquisition, Ranking};

pub const VEGETATION: u8 = 4;
pub const WATER: u8 = 6;
pub const CLOUD_HIGH: u8 = 9;

/// Clear aerosol reflectance, below every haze threshold.
pub const CLEAR_AEROSOL: u16 = 500;
/// Bright blue reflectance: cloud-classified pixels stay cloud.
pub const CLOUD_BLUE: u16 = 3000;

pub fn timestamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, day, 10, 30, 0).unwrap()
}

/// Acquisition whose rasters live under `<id>/` in a path-keyed store.
pub fn acquisition(id: &str, day: u32, invalid: f64) -> Acquisition {
    let dir = PathBuf::from(id);
    Acquisition {
        id: id.to_string(),
        tile: Some("32VNH".into()),
        timestamp: timestamp(day),
        invalid_percentage: invalid,
        paths: AcquisitionPaths {
            scl: dir.join("SCL_20m.tif"),
            aerosol: dir.join("B01_20m.tif"),
            blue: dir.join("B02_20m.tif"),
            bands: BandTable::from_fn(|band| dir.join(format!("{band}_10m.tif"))),
        },
    }
}

/// SCL raster: columns below `split` get `left`, the rest `right`.
pub fn split_scl(h: usize, w: usize, split: usize, left: u8, right: u8) -> Array2<u8> {
    Array2::from_shape_fn((h, w), |(_, c)| if c < split { left } else { right })
}

/// Blue band consistent with an SCL raster: bright over cloud, dark elsewhere.
pub fn blue_for(scl: &Array2<u8>) -> Array2<u16> {
    scl.mapv(|s| if s == CLOUD_HIGH { CLOUD_BLUE } else { 400 })
}

/// Store every raster of `acq` in `store`: scoring layers on an `h x w`
/// grid and output bands on a grid `scale` times finer.
pub fn store_acquisition(
    store: &MemoryRaster,
    acq: &Acquisition,
    scl: &Array2<u8>,
    scale: usize,
    band_value: impl Fn(usize, usize) -> u16,
) {
    let (h, w) = scl.dim();
    store.insert(&acq.paths.scl, scl.mapv(u16::from));
    store.insert(&acq.paths.aerosol, Array2::from_elem((h, w), CLEAR_AEROSOL));
    store.insert(&acq.paths.blue, blue_for(scl));
    for (_, path) in acq.paths.bands.iter() {
        store.insert(
            path,
            Array2::from_shape_fn((h * scale, w * scale), |(r, c)| band_value(r, c)),
        );
    }
}

/// Scoring parameters without spatial smoothing, so qualities are point-wise.
pub fn pointwise_params() -> QualityParams {
    QualityParams {
        nodata_dilation_radius: 0,
        erosion_radius: 0,
        blur_window: 1,
        ..QualityParams::default()
    }
}

/// Scored layers with uniform class and quality.
pub fn uniform_scored(h: usize, w: usize, scl: u8, quality: u8) -> ScoredAcquisition {
    ScoredAcquisition::new(
        Array2::from_elem((h, w), scl),
        Array2::from_elem((h, w), CLEAR_AEROSOL),
        Array2::from_elem((h, w), quality),
    )
    .unwrap()
}

/// Ranking whose entry `i` is source `i`, `days[i]` days from the reference.
pub fn ranking_with_days(days: &[i64]) -> Ranking {
    Ranking {
        entries: days
            .iter()
            .enumerate()
            .map(|(i, &d)| RankedAcquisition {
                source_index: i,
                time_difference: chrono::TimeDelta::days(d),
            })
            .collect(),
    }
}

/// Metadata source over a fixed list.
pub struct ListSource(pub Vec<Acquisition>);

impl MetadataSource for ListSource {
    fn acquisitions(&self) -> Result<Vec<Acquisition>> {
        Ok(self.0.clone())
    }
}
