//! Top-N recommendation from a user's rated items and item-item similarity.

use crate::matrix::InteractionMatrix;
use crate::similarity::SimilarityMatrix;
use itemcf_core::{EngineResult, Recommendation, ScoreAggregation, UserId};
use tracing::debug;

/// Rank the items `user_id` has not rated by summed similarity to the items
/// they have rated, returning at most `top_n` entries.
///
/// To weight each rated item's similarity by the user's rating instead, use
/// [`recommend_with`] with [`ScoreAggregation::RatingWeighted`].
pub fn recommend(
    user_id: UserId,
    matrix: &InteractionMatrix,
    similarity: &SimilarityMatrix,
    top_n: usize,
) -> EngineResult<Vec<Recommendation>> {
    recommend_with(
        user_id,
        matrix,
        similarity,
        top_n,
        ScoreAggregation::Similarity,
    )
}

/// Like [`recommend`], with a choice of how each rated item's evidence is
/// weighted.
///
/// For every rated item `r` and every unrated candidate `c`, the candidate
/// accumulates `sim(r, c)` (or `sim(r, c) * rating(r)`). Negative
/// similarities are added as-is and can push a score below zero. Results
/// are ordered by descending score, ties by ascending item id.
pub fn recommend_with(
    user_id: UserId,
    matrix: &InteractionMatrix,
    similarity: &SimilarityMatrix,
    top_n: usize,
    aggregation: ScoreAggregation,
) -> EngineResult<Vec<Recommendation>> {
    let row = matrix.require_user(user_id)?;
    if top_n == 0 {
        return Ok(Vec::new());
    }

    let columns = similarity.column_map(matrix);

    // Rated items that have a similarity row, with their evidence weight.
    let evidence: Vec<(usize, f64)> = matrix
        .rated_in_row(row)
        .filter_map(|(col, rating)| {
            columns[col].map(|pos| {
                let weight = match aggregation {
                    ScoreAggregation::Similarity => 1.0,
                    ScoreAggregation::RatingWeighted => rating,
                };
                (pos, weight)
            })
        })
        .collect();

    if evidence.is_empty() {
        debug!(user_id, "No rated items with similarity data, nothing to recommend");
        return Ok(Vec::new());
    }

    let candidates: Vec<(usize, usize)> = columns
        .iter()
        .enumerate()
        .filter(|&(col, _)| !matrix.is_rated(row, col))
        .filter_map(|(col, pos)| pos.map(|p| (col, p)))
        .collect();

    let mut items: Vec<Recommendation> = candidates
        .into_iter()
        .map(|(col, candidate)| {
            let score = evidence
                .iter()
                .map(|&(rated, weight)| similarity.value_at(rated, candidate) * weight)
                .sum();
            Recommendation {
                item_id: matrix.items()[col],
                score,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    items.truncate(top_n);

    debug!(
        user_id,
        rated = evidence.len(),
        returned = items.len(),
        "Recommendations generated"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::compute_similarity;
    use itemcf_core::EngineError;
    use ndarray::array;

    fn golden() -> (InteractionMatrix, SimilarityMatrix) {
        let m = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![10, 20, 30],
            array![[5.0, 3.0, 0.0], [4.0, 0.0, 5.0]],
        )
        .unwrap();
        let sim = compute_similarity(&m).unwrap();
        (m, sim)
    }

    #[test]
    fn test_recommends_only_unrated_item() {
        let (m, sim) = golden();
        let recs = recommend(1, &m, &sim, 1).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, 30);
        let expected = sim.similarity(10, 30).unwrap() + sim.similarity(20, 30).unwrap();
        assert!((recs[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rating_weighted_aggregation() {
        let (m, sim) = golden();
        let recs = recommend_with(1, &m, &sim, 1, ScoreAggregation::RatingWeighted).unwrap();
        assert_eq!(recs[0].item_id, 30);
        let expected =
            sim.similarity(10, 30).unwrap() * 5.0 + sim.similarity(20, 30).unwrap() * 3.0;
        assert!((recs[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_top_n_and_oversized_top_n() {
        let (m, sim) = golden();
        assert!(recommend(1, &m, &sim, 0).unwrap().is_empty());
        let recs = recommend(2, &m, &sim, 10).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, 20);
    }

    #[test]
    fn test_user_without_ratings_gets_nothing() {
        let m = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![10, 20],
            array![[0.0, 0.0], [4.0, 5.0]],
        )
        .unwrap();
        let sim = compute_similarity(&m).unwrap();
        assert!(recommend(1, &m, &sim, 5).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_user() {
        let (m, sim) = golden();
        assert!(matches!(
            recommend(99, &m, &sim, 3),
            Err(EngineError::UnknownUser(99))
        ));
        // Unknown users fail even when nothing would be returned.
        assert!(matches!(
            recommend(99, &m, &sim, 0),
            Err(EngineError::UnknownUser(99))
        ));
    }

    #[test]
    fn test_similarity_over_reordered_item_subset() {
        let (m, _) = golden();
        let other = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![30, 10, 40],
            array![[0.0, 5.0, 1.0], [5.0, 4.0, 1.0]],
        )
        .unwrap();
        let sim = compute_similarity(&other).unwrap();

        // 40 is not in the interaction matrix and never becomes a candidate.
        let recs = recommend(1, &m, &sim, 5).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, 30);
        let expected = 4.0 / 41f64.sqrt();
        assert!((recs[0].score - expected).abs() < 1e-12);
        assert_eq!(recs[0].score, sim.similarity(10, 30).unwrap());
    }

    #[test]
    fn test_ties_break_by_ascending_item_id() {
        let m = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![40, 30, 20, 10],
            array![[0.0, 0.0, 0.0, 5.0], [0.0, 4.0, 4.0, 4.0]],
        )
        .unwrap();
        let sim = compute_similarity(&m).unwrap();
        let recs = recommend(1, &m, &sim, 5).unwrap();
        let ids: Vec<u64> = recs.iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![20, 30, 40]);
        assert_eq!(recs[0].score, recs[1].score);
        assert_eq!(recs[2].score, 0.0);
    }

    #[test]
    fn test_negative_similarity_depresses_score() {
        let m = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![1, 2, 3],
            array![[1.0, 0.0, 0.0], [2.0, -2.0, 1.0]],
        )
        .unwrap();
        let sim = compute_similarity(&m).unwrap();
        let recs = recommend(1, &m, &sim, 5).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].item_id, 3);
        assert!(recs[0].score > 0.0);
        assert_eq!(recs[1].item_id, 2);
        assert!(recs[1].score < 0.0);
    }
}
