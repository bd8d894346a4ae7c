use lookalike::error::{LookalikeError, Result};
use lookalike::index::distance::euclidean_distance;
use lookalike::types::{Embedding, Neighbor};

/// Assert that distances never decrease and that equal distances keep
/// reference order.
pub fn assert_ranked(results: &[Neighbor]) {
    for pair in results.windows(2) {
        assert!(
            pair[0].distance <= pair[1].distance,
            "distances out of order: {} (pos {}) before {} (pos {})",
            pair[0].distance,
            pair[0].position,
            pair[1].distance,
            pair[1].position
        );
        if pair[0].distance == pair[1].distance {
            assert!(
                pair[0].position < pair[1].position,
                "tie at distance {} not in reference order: {} before {}",
                pair[0].distance,
                pair[0].position,
                pair[1].position
            );
        }
    }
}

/// Assert the returned identifiers, in order.
pub fn assert_ids(results: &[Neighbor], expected: &[&str]) {
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, expected, "unexpected ranking");
}

/// Assert the returned reference positions, in order.
pub fn assert_positions(results: &[Neighbor], expected: &[usize]) {
    let positions: Vec<usize> = results.iter().map(|r| r.position).collect();
    assert_eq!(positions, expected, "unexpected ranking");
}

/// Exhaustive reference ranking: sort every (distance, position) pair and keep `k`.
pub fn reference_ranking(reference: &[Embedding], query: &[f32], k: usize) -> Vec<usize> {
    let mut scored: Vec<(f32, usize)> = reference
        .iter()
        .enumerate()
        .map(|(i, row)| (euclidean_distance(query, row), i))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    scored.into_iter().take(k).map(|(_, i)| i).collect()
}

pub fn assert_invalid_reference_set<T: std::fmt::Debug>(result: Result<T>) {
    match result {
        Err(LookalikeError::InvalidReferenceSet { .. }) => {}
        other => panic!("expected InvalidReferenceSet error, got: {other:?}"),
    }
}

pub fn assert_dimension_mismatch<T: std::fmt::Debug>(
    result: Result<T>,
    expected_dim: usize,
    actual_dim: usize,
) {
    match result {
        Err(LookalikeError::DimensionMismatch { expected, actual }) => {
            assert_eq!(expected, expected_dim);
            assert_eq!(actual, actual_dim);
        }
        other => panic!("expected DimensionMismatch error, got: {other:?}"),
    }
}

pub fn assert_insufficient_data<T: std::fmt::Debug>(
    result: Result<T>,
    requested_k: usize,
    available_n: usize,
) {
    match result {
        Err(LookalikeError::InsufficientData {
            requested,
            available,
        }) => {
            assert_eq!(requested, requested_k);
            assert_eq!(available, available_n);
        }
        other => panic!("expected InsufficientData error, got: {other:?}"),
    }
}
