#[allow(dead_code)]
mod common;

use std::cell::Cell;

use cleartile_core::error::MosaicError;
use cleartile_core::ranking::{rank_acquisitions, rank_by_time, select_reference, RankingParams};

use common::acquisition;

// ---------------------------------------------------------------------------
// Reference selection
// ---------------------------------------------------------------------------

#[test]
fn test_clear_winner_is_not_scored() {
    let acqs = vec![
        acquisition("A", 1, 30.0),
        acquisition("B", 2, 5.0),
        acquisition("C", 3, 50.0),
    ];
    let calls = Cell::new(0);
    let reference = select_reference(&acqs, &RankingParams::default(), |_| {
        calls.set(calls.get() + 1);
        Ok(100.0)
    })
    .unwrap();
    assert_eq!(reference, 1);
    assert_eq!(calls.get(), 0, "no tie, no scoring");
}

#[test]
fn test_tie_is_broken_by_score() {
    let acqs = vec![
        acquisition("A", 1, 12.0),
        acquisition("B", 2, 5.0),
        acquisition("C", 3, 14.0),
        acquisition("D", 4, 40.0),
    ];
    let scores = [80.0, 50.0, 90.0, 99.0];
    let mut scored = Vec::new();
    let reference = select_reference(&acqs, &RankingParams::default(), |i| {
        scored.push(i);
        Ok(scores[i])
    })
    .unwrap();
    assert_eq!(reference, 2, "highest-scoring tied candidate wins");
    scored.sort();
    assert_eq!(scored, vec![0, 1, 2], "outside the window is never scored");
}

#[test]
fn test_duplicate_ids_scored_once() {
    let acqs = vec![
        acquisition("A", 1, 5.0),
        acquisition("A", 1, 6.0),
        acquisition("B", 2, 8.0),
    ];
    let mut scored = Vec::new();
    select_reference(&acqs, &RankingParams::default(), |i| {
        scored.push(i);
        Ok(50.0)
    })
    .unwrap();
    assert_eq!(scored, vec![0, 2]);
}

#[test]
fn test_equal_scores_keep_lowest_invalid() {
    let acqs = vec![acquisition("A", 1, 9.0), acquisition("B", 2, 4.0)];
    let reference = select_reference(&acqs, &RankingParams::default(), |_| Ok(70.0)).unwrap();
    assert_eq!(reference, 1, "equal scores keep the lowest invalid percentage");
}

#[test]
fn test_tie_window_is_configurable() {
    let acqs = vec![acquisition("A", 1, 9.0), acquisition("B", 2, 4.0)];
    let params = RankingParams {
        tie_window: 2.0,
        ..RankingParams::default()
    };
    let reference = select_reference(&acqs, &params, |i| Ok(if i == 0 { 99.0 } else { 1.0 })).unwrap();
    assert_eq!(reference, 1);
}

#[test]
fn test_scoring_error_propagates() {
    let acqs = vec![acquisition("A", 1, 9.0), acquisition("B", 2, 4.0)];
    let err = select_reference(&acqs, &RankingParams::default(), |_| {
        Err(MosaicError::UnsupportedRaster("rgb".into()))
    })
    .unwrap_err();
    assert!(matches!(err, MosaicError::UnsupportedRaster(_)));
}

#[test]
fn test_empty_input() {
    let err = select_reference(&[], &RankingParams::default(), |_| Ok(0.0)).unwrap_err();
    assert!(matches!(err, MosaicError::EmptySequence));
}

// ---------------------------------------------------------------------------
// Temporal ordering
// ---------------------------------------------------------------------------

#[test]
fn test_rank_by_time_orders_by_distance() {
    let acqs = vec![
        acquisition("A", 10, 5.0),
        acquisition("B", 3, 20.0),
        acquisition("C", 14, 20.0),
        acquisition("D", 7, 20.0),
    ];
    let ranking = rank_by_time(&acqs, 0);
    let order: Vec<usize> = ranking.entries.iter().map(|e| e.source_index).collect();
    assert_eq!(order, vec![0, 3, 2, 1]);
    assert_eq!(ranking.reference().source_index, 0);
    assert!((ranking.entries[1].days() - 3.0).abs() < 1e-9);
    assert!((ranking.entries[3].days() - 7.0).abs() < 1e-9);
}

#[test]
fn test_reference_first_on_equal_timestamps() {
    let acqs = vec![acquisition("A", 5, 30.0), acquisition("B", 5, 2.0)];
    let ranking = rank_by_time(&acqs, 1);
    assert_eq!(ranking.reference().source_index, 1);
    assert_eq!(ranking.get(1).map(|e| e.source_index), Some(0));
    assert!(ranking.get(2).is_none());
}

#[test]
fn test_rank_acquisitions_picks_reference_then_orders() {
    let acqs = vec![
        acquisition("A", 1, 35.0),
        acquisition("B", 20, 3.0),
        acquisition("C", 18, 60.0),
    ];
    let ranking = rank_acquisitions(&acqs, &RankingParams::default(), |_| Ok(0.0)).unwrap();
    let order: Vec<usize> = ranking.entries.iter().map(|e| e.source_index).collect();
    assert_eq!(order, vec![1, 2, 0]);
    assert_eq!(ranking.len(), 3);
}
