//! Similarity computation and ranking.

use ordered_float::OrderedFloat;

use crate::error::{Result, StoreError};

/// Compute the cosine similarity between two vectors.
///
/// Works on raw vectors: `dot(a, b) / (|a| * |b|)`. Returns a value between
/// -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors (or a zero-magnitude operand)
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(StoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// Keep the `k` best scored items, highest score first.
///
/// The input must be in insertion order: the sort is stable, so equal scores
/// keep that order. Items below `min_score` and NaN scores are dropped.
pub fn top_k<T>(scored: Vec<(f32, T)>, k: usize, min_score: Option<f32>) -> Vec<(f32, T)> {
    let mut kept: Vec<(f32, T)> = scored
        .into_iter()
        .filter(|(score, _)| !score.is_nan())
        .filter(|(score, _)| min_score.is_none_or(|min| *score >= min))
        .collect();

    kept.sort_by_key(|(score, _)| std::cmp::Reverse(OrderedFloat(*score)));
    kept.truncate(k);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_ignores_magnitude() {
        let a = vec![3.0, 4.0];
        let b = vec![0.3, 0.4];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(StoreError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_top_k_orders_and_limits() {
        let scored = vec![(0.1, "low"), (0.9, "high"), (0.5, "mid")];
        let ranked = top_k(scored, 2, None);
        assert_eq!(ranked, vec![(0.9, "high"), (0.5, "mid")]);
    }

    #[test]
    fn test_top_k_ties_keep_input_order() {
        let scored = vec![(0.5, "first"), (0.7, "best"), (0.5, "second"), (0.5, "third")];
        let ranked = top_k(scored, 10, None);
        assert_eq!(
            ranked,
            vec![(0.7, "best"), (0.5, "first"), (0.5, "second"), (0.5, "third")]
        );
    }

    #[test]
    fn test_top_k_min_score() {
        let scored = vec![(0.2, "a"), (0.8, "b"), (f32::NAN, "nan")];
        let ranked = top_k(scored, 10, Some(0.5));
        assert_eq!(ranked, vec![(0.8, "b")]);
    }
}
