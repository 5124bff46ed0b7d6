#[allow(dead_code)]
mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ndarray::Array2;

use cleartile_core::acquisition::Acquisition;
use cleartile_core::composite::Termination;
use cleartile_core::error::MosaicError;
use cleartile_core::io::{GridResampler, MemoryRaster};
use cleartile_core::pipeline::{
    build_mosaic, rank_manifest, run_mosaic, run_mosaic_reported, MosaicConfig, NoOpReporter,
    PipelineConfig, PipelineStage, ProgressReporter,
};

use common::{
    acquisition, pointwise_params, split_scl, store_acquisition, ListSource, CLOUD_HIGH,
    VEGETATION,
};

/// Output bands vary by row only, so both halves of the tile share statistics.
fn row_ramp(r: usize, _c: usize) -> u16 {
    1000 + r as u16 * 10
}

fn pointwise_config() -> MosaicConfig {
    let mut config = MosaicConfig {
        quality: pointwise_params(),
        ..MosaicConfig::default()
    };
    config.blend.noise_reduction = false;
    config
}

fn pipeline_config(mosaic: MosaicConfig) -> PipelineConfig {
    PipelineConfig {
        output_dir: PathBuf::from("out"),
        mosaic,
        ..PipelineConfig::default()
    }
}

/// A: clouded left half, reference. B: clouded right half, five days later.
fn complementary_pair(store: &MemoryRaster) -> Vec<Acquisition> {
    let a = acquisition("A", 1, 40.0);
    let b = acquisition("B", 6, 55.0);
    store_acquisition(store, &a, &split_scl(12, 12, 6, CLOUD_HIGH, VEGETATION), 2, row_ramp);
    store_acquisition(store, &b, &split_scl(12, 12, 6, VEGETATION, CLOUD_HIGH), 2, row_ramp);
    vec![a, b]
}

#[derive(Default)]
struct StageRecorder {
    stages: Mutex<Vec<PipelineStage>>,
}

impl ProgressReporter for StageRecorder {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_complementary_pair_fills_clouds() {
    let store = MemoryRaster::new();
    let source = ListSource(complementary_pair(&store));
    let config = pipeline_config(pointwise_config());

    let output = run_mosaic(&config, &source, &store, &GridResampler).unwrap();

    assert_eq!(output.reference_id, "A");
    assert_eq!(output.accepted_ids, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(output.termination, Termination::TargetReached);
    assert!((output.initial_quality - 55.0).abs() < 1e-9);
    assert!((output.average_quality - 100.0).abs() < 1e-9);
    assert!(output.harmonized && output.feathered);
    assert!(!output.is_pass_through());

    assert_eq!(output.tracking.dim(), (24, 24));
    assert_eq!(output.tracking[[0, 0]], 1, "clouded half comes from B");
    assert_eq!(output.tracking[[0, 23]], 0, "clear half stays with A");
    assert_eq!(output.scl[[5, 3]], VEGETATION);
    assert!(output.scl.iter().all(|&s| s == VEGETATION));

    for r in [0, 7, 23] {
        for c in [0, 11, 12, 23] {
            assert_eq!(
                output.bands.b04[[r, c]],
                row_ramp(r, c),
                "band value changed at ({r}, {c})"
            );
        }
    }

    assert_eq!(output.written.len(), 6);
    let tracking_path = config.output_path("tracking");
    assert!(output.written.contains(&tracking_path));
    let stored = store.get(&tracking_path).unwrap();
    assert_eq!(stored[[0, 0]], 1);
    assert!(store.contains(&config.output_path("scl")));
    assert!(store.contains(&config.output_path("B08")));
}

#[test]
fn test_stages_are_reported_in_order() {
    let store = MemoryRaster::new();
    let source = ListSource(complementary_pair(&store));
    let recorder = Arc::new(StageRecorder::default());
    run_mosaic_reported(
        &pipeline_config(pointwise_config()),
        &source,
        &store,
        &GridResampler,
        recorder.clone(),
    )
    .unwrap();
    let stages = recorder.stages.lock().unwrap().clone();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Validating,
            PipelineStage::Ranking,
            PipelineStage::Compositing,
            PipelineStage::Harmonizing,
            PipelineStage::Filtering,
            PipelineStage::Feathering,
            PipelineStage::Blending,
            PipelineStage::Writing,
        ]
    );
}

#[test]
fn test_hard_cut_without_harmonization() {
    let store = MemoryRaster::new();
    let acqs = complementary_pair(&store);
    let mut config = pointwise_config();
    config.harmonization.enabled = false;
    config.blend.feather = false;
    config.blend.filter_tracking = false;

    let output = build_mosaic(&acqs, &config, &store, &GridResampler, &NoOpReporter).unwrap();
    assert!(!output.harmonized);
    assert!(!output.feathered);
    assert_eq!(output.bands.b02[[9, 2]], row_ramp(9, 2));
    assert!(output.written.is_empty());
}

// ---------------------------------------------------------------------------
// Single-source runs
// ---------------------------------------------------------------------------

#[test]
fn test_single_acquisition_passes_through() {
    let store = MemoryRaster::new();
    let a = acquisition("A", 1, 40.0);
    store_acquisition(&store, &a, &split_scl(12, 12, 6, CLOUD_HIGH, VEGETATION), 2, |r, c| {
        (r * 24 + c) as u16
    });

    let output =
        build_mosaic(&[a], &pointwise_config(), &store, &GridResampler, &NoOpReporter).unwrap();
    assert!(output.is_pass_through());
    assert_eq!(output.termination, Termination::CandidatesExhausted);
    assert!(!output.harmonized && !output.feathered);
    assert!(output.tracking.iter().all(|&t| t == 0));
    let expected = Array2::from_shape_fn((24, 24), |(r, c)| (r * 24 + c) as u16);
    assert_eq!(output.bands.b03, expected);
}

#[test]
fn test_perfect_reference_skips_blending_stages() {
    let store = MemoryRaster::new();
    let a = acquisition("A", 1, 0.0);
    let b = acquisition("B", 2, 30.0);
    store_acquisition(&store, &a, &Array2::from_elem((12, 12), VEGETATION), 2, row_ramp);
    store_acquisition(&store, &b, &Array2::from_elem((12, 12), VEGETATION), 2, |_, _| 5);

    let output =
        build_mosaic(&[a, b], &pointwise_config(), &store, &GridResampler, &NoOpReporter).unwrap();
    assert_eq!(output.termination, Termination::TargetReached);
    assert_eq!(output.accepted_ids, vec!["A".to_string()]);
    assert_eq!(output.scanned, 0);
    assert!(!output.harmonized && !output.feathered);
    assert_eq!(output.bands.b08[[4, 4]], row_ramp(4, 4));
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[test]
fn test_tied_reference_is_chosen_by_score() {
    let store = MemoryRaster::new();
    let a = acquisition("A", 1, 40.0);
    let b = acquisition("B", 9, 45.0);
    store_acquisition(&store, &a, &split_scl(12, 12, 6, CLOUD_HIGH, VEGETATION), 2, row_ramp);
    store_acquisition(&store, &b, &Array2::from_elem((12, 12), VEGETATION), 2, row_ramp);

    let ranking = rank_manifest(&[a, b], &MosaicConfig::default(), &store, &GridResampler).unwrap();
    assert_eq!(ranking.reference().source_index, 1, "clear acquisition wins the tie");
    assert_eq!(ranking.get(1).map(|e| e.source_index), Some(0));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_grid_mismatch_aborts() {
    let store = MemoryRaster::new();
    let a = acquisition("A", 1, 40.0);
    let b = acquisition("B", 6, 55.0);
    store_acquisition(&store, &a, &split_scl(12, 12, 6, CLOUD_HIGH, VEGETATION), 2, row_ramp);
    store_acquisition(&store, &b, &split_scl(10, 10, 5, VEGETATION, CLOUD_HIGH), 2, row_ramp);

    let err = build_mosaic(&[a, b], &pointwise_config(), &store, &GridResampler, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, MosaicError::ShapeMismatch { .. }), "got {err}");
}

#[test]
fn test_missing_raster_aborts() {
    let store = MemoryRaster::new();
    let acqs = complementary_pair(&store);
    let mut ghost = acquisition("C", 3, 70.0);
    ghost.paths.scl = PathBuf::from("C/missing.tif");
    store_acquisition(&store, &ghost, &Array2::from_elem((12, 12), VEGETATION), 2, row_ramp);
    let acqs = vec![acqs[0].clone(), ghost];

    let err = build_mosaic(&acqs, &pointwise_config(), &store, &GridResampler, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, MosaicError::Io(_)), "got {err}");
}

#[test]
fn test_mixed_tiles_are_rejected() {
    let store = MemoryRaster::new();
    let mut acqs = complementary_pair(&store);
    acqs[1].tile = Some("33UVP".into());
    let err = build_mosaic(&acqs, &pointwise_config(), &store, &GridResampler, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, MosaicError::MixedTiles { .. }));
}

#[test]
fn test_empty_and_invalid_inputs() {
    let store = MemoryRaster::new();
    let err = build_mosaic(&[], &MosaicConfig::default(), &store, &GridResampler, &NoOpReporter)
        .unwrap_err();
    assert!(matches!(err, MosaicError::EmptySequence));

    let mut config = MosaicConfig::default();
    config.compositor.max_search_images = 300;
    let acqs = complementary_pair(&store);
    let err = build_mosaic(&acqs, &config, &store, &GridResampler, &NoOpReporter).unwrap_err();
    assert!(matches!(err, MosaicError::InvalidConfig(_)));
}
