#[allow(dead_code)]
mod common;

use ndarray::Array2;

use cleartile_core::composite::{
    acceptance_threshold, composite, CompositorConfig, CompositorState, ScoredAcquisition,
    Termination, TrackingCompositor,
};
use cleartile_core::error::MosaicError;
use cleartile_core::quality::QualityParams;

use common::{ranking_with_days, uniform_scored, CLEAR_AEROSOL, VEGETATION};

/// Scored acquisition whose quality is set per column.
fn column_scored(h: usize, cols: &[u8]) -> ScoredAcquisition {
    let w = cols.len();
    ScoredAcquisition::new(
        Array2::from_elem((h, w), VEGETATION),
        Array2::from_elem((h, w), CLEAR_AEROSOL),
        Array2::from_shape_fn((h, w), |(_, c)| cols[c]),
    )
    .unwrap()
}

/// Run the driver over `scored` (one per ranking position, all day 0 unless given).
fn run(
    scored: &[ScoredAcquisition],
    days: &[i64],
    config: &CompositorConfig,
) -> cleartile_core::composite::CompositeOutcome {
    let ranking = ranking_with_days(days);
    composite(
        &ranking,
        |ranked| Ok(scored[ranked.source_index].clone()),
        config,
        &QualityParams::default(),
        |_| {},
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Acceptance threshold
// ---------------------------------------------------------------------------

#[test]
fn test_threshold_decays_with_quality() {
    let config = CompositorConfig::default();
    let t0 = acceptance_threshold(0.0, &config);
    let t50 = acceptance_threshold(50.0, &config);
    let t99 = acceptance_threshold(99.0, &config);
    assert!((t0 - 2.0012).abs() < 1e-9, "t0 = {t0}");
    assert!(t0 > t50 && t50 > t99, "not decreasing: {t0} {t50} {t99}");
    assert!(t99 > 0.1 && t99 < 0.13, "t99 = {t99}");

    let low = [0.0, 5.0, 9.9].map(|q| acceptance_threshold(q, &config));
    assert!(low[0] > low[1] && low[1] > low[2], "not decreasing: {low:?}");
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

#[test]
fn test_perfect_reference_stops_immediately() {
    let scored = vec![uniform_scored(8, 8, VEGETATION, 10), uniform_scored(8, 8, VEGETATION, 10)];
    let outcome = run(&scored, &[0, 1], &CompositorConfig::default());
    assert_eq!(outcome.termination, Termination::TargetReached);
    assert_eq!(outcome.processed_indices, vec![0]);
    assert_eq!(outcome.scanned, 0);
    assert!(!outcome.is_multi_source());
    assert!(outcome.tracking.iter().all(|&t| t == 0));
}

#[test]
fn test_better_candidate_takes_over() {
    let scored = vec![uniform_scored(8, 8, VEGETATION, 3), uniform_scored(8, 8, VEGETATION, 9)];
    let outcome = run(&scored, &[0, 2], &CompositorConfig::default());
    assert_eq!(outcome.processed_indices, vec![0, 1]);
    assert!(outcome.tracking.iter().all(|&t| t == 1));
    assert!((outcome.average_quality - 90.0).abs() < 1e-9);
    assert!((outcome.initial_average - 30.0).abs() < 1e-9);
    assert_eq!(outcome.termination, Termination::CandidatesExhausted);
    assert_eq!(outcome.contributions.len(), 2);
    assert!(outcome.contributions[1].quality.iter().all(|&q| q == 9));
}

#[test]
fn test_search_limit() {
    let scored = vec![
        uniform_scored(4, 4, VEGETATION, 3),
        uniform_scored(4, 4, VEGETATION, 3),
        uniform_scored(4, 4, VEGETATION, 9),
    ];
    let config = CompositorConfig {
        max_search_images: 1,
        ..CompositorConfig::default()
    };
    let outcome = run(&scored, &[0, 1, 2], &config);
    assert_eq!(outcome.termination, Termination::SearchLimit);
    assert_eq!(outcome.scanned, 1);
    assert_eq!(outcome.processed_indices, vec![0]);
}

#[test]
fn test_include_limit() {
    let scored = vec![
        uniform_scored(4, 4, VEGETATION, 3),
        uniform_scored(4, 4, VEGETATION, 9),
        uniform_scored(4, 4, VEGETATION, 10),
    ];
    let config = CompositorConfig {
        max_images_include: 2,
        ..CompositorConfig::default()
    };
    let outcome = run(&scored, &[0, 1, 2], &config);
    assert_eq!(outcome.termination, Termination::IncludeLimit);
    assert_eq!(outcome.processed_indices, vec![0, 1]);
}

#[test]
fn test_age_limit() {
    let scored = vec![uniform_scored(4, 4, VEGETATION, 3), uniform_scored(4, 4, VEGETATION, 9)];
    let outcome = run(&scored, &[0, 31], &CompositorConfig::default());
    assert_eq!(outcome.termination, Termination::AgeLimit);
    assert_eq!(outcome.scanned, 0);

    // Exactly on the window edge is still scanned.
    let outcome = run(&scored, &[0, 30], &CompositorConfig::default());
    assert_eq!(outcome.processed_indices, vec![0, 1]);
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

#[test]
fn test_small_gain_is_rejected() {
    let reference = uniform_scored(10, 10, VEGETATION, 9);
    let mut quality = Array2::from_elem((10, 10), 9u8);
    quality[[4, 4]] = 10;
    let candidate = ScoredAcquisition::new(
        Array2::from_elem((10, 10), VEGETATION),
        Array2::from_elem((10, 10), CLEAR_AEROSOL),
        quality,
    )
    .unwrap();

    let compositor =
        TrackingCompositor::new(reference, CompositorConfig::default(), QualityParams::default());
    let decision = compositor.evaluate(1, &candidate).unwrap();
    assert_eq!(decision.changed_pixels(), 1);
    assert!((decision.improvement() - 0.1).abs() < 1e-9);
    assert!(
        decision.threshold > 0.15 && decision.threshold < 0.17,
        "threshold {}",
        decision.threshold
    );
    assert!(!decision.accepted, "gain below threshold must be rejected");
}

#[test]
fn test_every_pixel_has_one_owner() {
    let scored = vec![
        column_scored(4, &[2, 2, 10, 10]),
        column_scored(4, &[9, 2, 2, 2]),
        column_scored(4, &[2, 9, 2, 2]),
    ];
    let outcome = run(&scored, &[0, 1, 2], &CompositorConfig::default());
    assert_eq!(outcome.processed_indices, vec![0, 1, 2]);
    for r in 0..4 {
        assert_eq!(outcome.tracking[[r, 0]], 1);
        assert_eq!(outcome.tracking[[r, 1]], 2);
        assert_eq!(outcome.tracking[[r, 2]], 0);
        assert_eq!(outcome.tracking[[r, 3]], 0);
    }
    let claimed: usize = outcome
        .processed_indices
        .iter()
        .map(|&i| outcome.claimed_pixels(i))
        .sum();
    assert_eq!(claimed, 16, "claims must partition the grid");
    assert_eq!(outcome.claimed_pixels(0), 8);
    assert!(outcome
        .tracking
        .iter()
        .all(|t| outcome.processed_indices.contains(&(*t as usize))));
    assert!(
        outcome.average_quality >= outcome.initial_average,
        "quality fell from {} to {}",
        outcome.initial_average,
        outcome.average_quality
    );
}

#[test]
fn test_evaluate_does_not_modify_state() {
    let compositor = TrackingCompositor::new(
        uniform_scored(4, 4, VEGETATION, 3),
        CompositorConfig::default(),
        QualityParams::default(),
    );
    let candidate = uniform_scored(4, 4, VEGETATION, 9);
    let first = compositor.evaluate(1, &candidate).unwrap();
    let second = compositor.evaluate(1, &candidate).unwrap();
    assert!(first.accepted && second.accepted);
    assert_eq!(first.merged_average, second.merged_average);
    assert_eq!(compositor.state(), CompositorState::Init);
    assert!((compositor.average_quality() - 30.0).abs() < 1e-9);
    assert!(compositor.tracking().iter().all(|&t| t == 0));
    assert_eq!(compositor.processed_indices(), &[0]);
}

#[test]
fn test_apply_commits_only_accepted() {
    let mut compositor = TrackingCompositor::new(
        uniform_scored(4, 4, VEGETATION, 3),
        CompositorConfig::default(),
        QualityParams::default(),
    );
    let worse = uniform_scored(4, 4, VEGETATION, 2);
    let decision = compositor.evaluate(1, &worse).unwrap();
    assert!(!decision.accepted);
    compositor.apply(decision, worse).unwrap();
    assert_eq!(compositor.scanned(), 1);
    assert_eq!(compositor.processed_indices(), &[0]);
    assert_eq!(compositor.state(), CompositorState::Scanning);

    let better = uniform_scored(4, 4, VEGETATION, 9);
    let decision = compositor.evaluate(2, &better).unwrap();
    compositor.apply(decision, better).unwrap();
    assert_eq!(compositor.processed_indices(), &[0, 2]);
    assert!(compositor.tracking().iter().all(|&t| t == 2));
    assert!(compositor.current_quality().iter().all(|&q| q == 9));
}

#[test]
fn test_apply_after_termination_fails() {
    let mut compositor = TrackingCompositor::new(
        uniform_scored(4, 4, VEGETATION, 3),
        CompositorConfig::default(),
        QualityParams::default(),
    );
    let candidate = uniform_scored(4, 4, VEGETATION, 9);
    let decision = compositor.evaluate(1, &candidate).unwrap();
    compositor.terminate(Termination::SearchLimit);
    assert!(compositor.apply(decision, candidate).is_err());
    assert_eq!(compositor.finish().termination, Termination::SearchLimit);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_candidate_shape_mismatch() {
    let compositor = TrackingCompositor::new(
        uniform_scored(4, 4, VEGETATION, 3),
        CompositorConfig::default(),
        QualityParams::default(),
    );
    let err = compositor
        .evaluate(1, &uniform_scored(5, 4, VEGETATION, 9))
        .unwrap_err();
    assert!(matches!(err, MosaicError::ShapeMismatch { .. }), "got {err}");
}

#[test]
fn test_reference_position_is_not_a_candidate() {
    let compositor = TrackingCompositor::new(
        uniform_scored(4, 4, VEGETATION, 3),
        CompositorConfig::default(),
        QualityParams::default(),
    );
    let candidate = uniform_scored(4, 4, VEGETATION, 9);
    assert!(compositor.evaluate(0, &candidate).is_err());
    assert!(compositor.evaluate(256, &candidate).is_err());
}

#[test]
fn test_driver_reports_every_decision() {
    let scored = vec![
        uniform_scored(4, 4, VEGETATION, 3),
        uniform_scored(4, 4, VEGETATION, 2),
        uniform_scored(4, 4, VEGETATION, 9),
    ];
    let mut seen = Vec::new();
    let outcome = composite(
        &ranking_with_days(&[0, 1, 2]),
        |ranked| Ok(scored[ranked.source_index].clone()),
        &CompositorConfig::default(),
        &QualityParams::default(),
        |decision| seen.push((decision.index, decision.accepted)),
    )
    .unwrap();
    assert_eq!(seen, vec![(1, false), (2, true)]);
    assert_eq!(outcome.scanned, 2);
}
