//! Fitted item-based CF model: an interaction matrix together with the
//! similarity matrix derived from it.

use crate::evaluate::{self, EvaluationReport};
use crate::matrix::InteractionMatrix;
use crate::predict;
use crate::recommend;
use crate::similarity::{compute_similarity_with, SimilarityMatrix};
use itemcf_core::config::SimilarityConfig;
use itemcf_core::{EngineResult, ItemId, Recommendation, ScoreAggregation, UserId};
use tracing::info;

/// Read-only after [`ItemCfEngine::fit`]; queries take `&self` and may run
/// from any number of threads at once.
#[derive(Debug, Clone)]
pub struct ItemCfEngine {
    matrix: InteractionMatrix,
    similarity: SimilarityMatrix,
}

impl ItemCfEngine {
    /// Derive the similarity matrix and take ownership of both.
    pub fn fit(matrix: InteractionMatrix, config: &SimilarityConfig) -> EngineResult<Self> {
        let similarity = compute_similarity_with(&matrix, config)?;
        info!(
            users = matrix.user_count(),
            items = matrix.item_count(),
            ratings = matrix.rating_count(),
            "Item CF engine fitted"
        );
        Ok(Self { matrix, similarity })
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn recommend(&self, user_id: UserId, top_n: usize) -> EngineResult<Vec<Recommendation>> {
        recommend::recommend(user_id, &self.matrix, &self.similarity, top_n)
    }

    pub fn recommend_with(
        &self,
        user_id: UserId,
        top_n: usize,
        aggregation: ScoreAggregation,
    ) -> EngineResult<Vec<Recommendation>> {
        recommend::recommend_with(user_id, &self.matrix, &self.similarity, top_n, aggregation)
    }

    /// The `n` items most similar to `item_id`, excluding itself.
    pub fn similar_items(&self, item_id: ItemId, n: usize) -> EngineResult<Vec<(ItemId, f64)>> {
        self.similarity.similar_items(item_id, n)
    }

    pub fn predict(&self, user_id: UserId, item_id: ItemId) -> EngineResult<f64> {
        predict::predict(user_id, item_id, &self.matrix, &self.similarity)
    }

    pub fn evaluate(&self, sample: &[UserId], items_per_user: usize) -> EngineResult<f64> {
        evaluate::evaluate(sample, &self.matrix, &self.similarity, items_per_user)
    }

    pub fn evaluate_report(
        &self,
        sample: &[UserId],
        items_per_user: usize,
    ) -> EngineResult<EvaluationReport> {
        evaluate::evaluate_report(sample, &self.matrix, &self.similarity, items_per_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemcf_core::EngineError;
    use ndarray::array;

    fn engine() -> ItemCfEngine {
        let m = InteractionMatrix::from_dense(
            vec![1, 2],
            vec![10, 20, 30],
            array![[5.0, 3.0, 0.0], [4.0, 0.0, 5.0]],
        )
        .unwrap();
        ItemCfEngine::fit(m, &SimilarityConfig::default()).unwrap()
    }

    #[test]
    fn test_fit_and_query() {
        let engine = engine();
        assert_eq!(engine.similarity().len(), 3);
        assert_eq!(engine.recommend(1, 5).unwrap()[0].item_id, 30);
        assert!((engine.predict(1, 30).unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(engine.similar_items(30, 1).unwrap()[0].0, 10);
        assert!(engine.evaluate(&[1, 2], 2).unwrap() >= 0.0);
        assert_eq!(engine.evaluate_report(&[1], 2).unwrap().evaluated_pairs, 2);
    }

    #[test]
    fn test_fit_empty_matrix_fails() {
        let m = InteractionMatrix::from_records(Vec::new()).unwrap();
        assert!(matches!(
            ItemCfEngine::fit(m, &SimilarityConfig::default()),
            Err(EngineError::EmptyMatrix)
        ));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ItemCfEngine>();
    }
}
