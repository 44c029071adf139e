//! Similarity-weighted rating prediction.

use crate::matrix::InteractionMatrix;
use crate::similarity::SimilarityMatrix;
use itemcf_core::{EngineError, EngineResult, ItemId, UserId};

/// Estimate the rating `user_id` would give `item_id`:
/// `sum(sim(item, s) * rating(s)) / sum(sim(item, s))` over the user's rated
/// items `s`.
///
/// Returns `0.0` when the user has rated nothing or the similarity sum is
/// zero. Negative similarities take part in both sums, so the estimate is
/// not clamped to the rating scale.
pub fn predict(
    user_id: UserId,
    item_id: ItemId,
    matrix: &InteractionMatrix,
    similarity: &SimilarityMatrix,
) -> EngineResult<f64> {
    let row = matrix.require_user(user_id)?;
    if !matrix.contains_item(item_id) {
        return Err(EngineError::UnknownItem(item_id));
    }
    let target = similarity.require(item_id)?;

    let columns = similarity.column_map(matrix);
    let mut weighted_sum = 0.0;
    let mut similarity_sum = 0.0;
    for (col, rating) in matrix.rated_in_row(row) {
        if let Some(pos) = columns[col] {
            let sim = similarity.value_at(target, pos);
            weighted_sum += sim * rating;
            similarity_sum += sim;
        }
    }

    if similarity_sum == 0.0 {
        return Ok(0.0);
    }
    Ok(weighted_sum / similarity_sum)
}
