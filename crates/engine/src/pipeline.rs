//! Offline benchmark run: fit the engine, report recommendations for a target
//! user, and score the predictor on a sample of known ratings.

use crate::engine::ItemCfEngine;
use crate::evaluate::{EvaluationReport, UserSample};
use crate::matrix::InteractionMatrix;
use chrono::{DateTime, Utc};
use itemcf_core::{EngineConfig, EngineError, EngineResult, ItemId, Recommendation, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub users: usize,
    pub items: usize,
    pub ratings: usize,
    pub target_user: Option<UserId>,
    pub recommendations: Vec<Recommendation>,
    /// Nearest items to each recommended item, by descending similarity.
    pub neighbors: BTreeMap<ItemId, Vec<(ItemId, f64)>>,
    /// `None` when the sample produced no usable predictions.
    pub evaluation: Option<EvaluationReport>,
}

impl BenchmarkReport {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn run_benchmark(
    matrix: InteractionMatrix,
    config: &EngineConfig,
) -> EngineResult<BenchmarkReport> {
    let run_id = Uuid::new_v4();
    info!(
        run_id = %run_id,
        users = matrix.user_count(),
        items = matrix.item_count(),
        "Benchmark run starting"
    );

    let engine = ItemCfEngine::fit(matrix, &config.similarity)?;

    let recommendations = match config.target_user {
        Some(user_id) if engine.matrix().contains_user(user_id) => {
            let recs = engine.recommend_with(
                user_id,
                config.recommend.top_n,
                config.recommend.aggregation,
            )?;
            for rec in &recs {
                info!(user_id, item_id = rec.item_id, score = rec.score, "Recommendation");
            }
            recs
        }
        Some(user_id) => {
            warn!(user_id, "Target user not in interaction matrix, skipping recommendations");
            Vec::new()
        }
        None => Vec::new(),
    };

    let mut neighbors = BTreeMap::new();
    for rec in &recommendations {
        neighbors.insert(
            rec.item_id,
            engine.similar_items(rec.item_id, config.recommend.top_n)?,
        );
    }

    let sample = UserSample::from_config(&config.evaluation).resolve(engine.matrix());
    let evaluation = match engine.evaluate_report(&sample, config.evaluation.items_per_user) {
        Ok(report) => Some(report),
        Err(EngineError::NoEvaluableData { users }) => {
            warn!(users, "No evaluable predictions in sample, RMSE unavailable");
            None
        }
        Err(e) => return Err(e),
    };

    let matrix = engine.matrix();
    Ok(BenchmarkReport {
        run_id,
        generated_at: Utc::now(),
        users: matrix.user_count(),
        items: matrix.item_count(),
        ratings: matrix.rating_count(),
        target_user: config.target_user,
        recommendations,
        neighbors,
        evaluation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemcf_core::RatingRecord;

    fn ratings() -> InteractionMatrix {
        InteractionMatrix::from_records(vec![
            RatingRecord::new(1, 10, 5.0),
            RatingRecord::new(1, 20, 3.0),
            RatingRecord::new(2, 10, 4.0),
            RatingRecord::new(2, 30, 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_benchmark_report() {
        let report = run_benchmark(ratings(), &EngineConfig::default()).unwrap();
        assert_eq!(report.users, 2);
        assert_eq!(report.items, 3);
        assert_eq!(report.ratings, 4);
        assert_eq!(report.target_user, Some(1));
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].item_id, 30);
        let nearest = &report.neighbors[&30];
        assert_eq!(nearest.len(), 2);
        assert_eq!(nearest[0].0, 10);
        assert_eq!(nearest[1], (20, 0.0));

        let evaluation = report.evaluation.as_ref().unwrap();
        assert_eq!(evaluation.evaluated_pairs, 4);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"rmse\""));
        let parsed: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(
            parsed.neighbors.keys().collect::<Vec<_>>(),
            report.neighbors.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_missing_target_user_is_skipped() {
        let config = EngineConfig {
            target_user: Some(404),
            ..Default::default()
        };
        let report = run_benchmark(ratings(), &config).unwrap();
        assert!(report.recommendations.is_empty());
        assert!(report.neighbors.is_empty());
        assert!(report.evaluation.is_some());
    }

    #[test]
    fn test_no_evaluable_data_yields_empty_evaluation() {
        let mut config = EngineConfig::default();
        config.evaluation.items_per_user = 0;
        let report = run_benchmark(ratings(), &config).unwrap();
        assert!(report.evaluation.is_none());
    }

    #[test]
    fn test_empty_matrix_propagates() {
        let empty = InteractionMatrix::from_records(Vec::new()).unwrap();
        assert!(matches!(
            run_benchmark(empty, &EngineConfig::default()),
            Err(EngineError::EmptyMatrix)
        ));
    }
}
