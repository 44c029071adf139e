//! RMSE benchmark over a sample of users' known ratings.
//!
//! The predictor is scored on ratings that were also used to build the
//! similarity matrix. There is no held-out split, so the reported error is
//! an optimistic sanity check rather than a generalization estimate.

use crate::matrix::InteractionMatrix;
use crate::predict::predict;
use crate::similarity::SimilarityMatrix;
use itemcf_core::config::EvaluationConfig;
use itemcf_core::types::SamplingStrategy;
use itemcf_core::{EngineError, EngineResult, UserId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub rmse: f64,
    pub mae: f64,
    /// (actual, predicted) pairs that entered the error metrics.
    pub evaluated_pairs: usize,
    /// Predictions that came back as zero or negative and were left out.
    pub skipped_no_signal: usize,
    pub users_evaluated: usize,
}

/// Which users the harness evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSample {
    /// The first `n` users in row order.
    Head(usize),
    /// `size` users drawn reproducibly from `seed`, returned in row order.
    Seeded { size: usize, seed: u64 },
    All,
}

impl UserSample {
    pub fn from_config(config: &EvaluationConfig) -> Self {
        match config.sampling {
            SamplingStrategy::Head => UserSample::Head(config.sample_users),
            SamplingStrategy::Seeded => UserSample::Seeded {
                size: config.sample_users,
                seed: config.seed,
            },
            SamplingStrategy::All => UserSample::All,
        }
    }

    pub fn resolve(&self, matrix: &InteractionMatrix) -> Vec<UserId> {
        let users = matrix.users();
        match *self {
            UserSample::Head(n) => users.iter().take(n).copied().collect(),
            UserSample::Seeded { size, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut picked =
                    rand::seq::index::sample(&mut rng, users.len(), size.min(users.len()))
                        .into_vec();
                picked.sort_unstable();
                picked.into_iter().map(|row| users[row]).collect()
            }
            UserSample::All => users.to_vec(),
        }
    }
}

/// Root-mean-squared error of predictions over up to `items_per_user` of
/// each sampled user's rated items.
///
/// Fails with [`EngineError::NoEvaluableData`] when no prediction in the
/// sample carried signal.
pub fn evaluate(
    sample: &[UserId],
    matrix: &InteractionMatrix,
    similarity: &SimilarityMatrix,
    items_per_user: usize,
) -> EngineResult<f64> {
    evaluate_report(sample, matrix, similarity, items_per_user).map(|report| report.rmse)
}

/// Full evaluation result: RMSE, MAE, and how many pairs were used.
///
/// Each user's rated items are taken in column order. Predictions that are
/// not strictly positive mean "no signal" and are skipped rather than
/// counted as a predicted zero.
pub fn evaluate_report(
    sample: &[UserId],
    matrix: &InteractionMatrix,
    similarity: &SimilarityMatrix,
    items_per_user: usize,
) -> EngineResult<EvaluationReport> {
    let mut pairs: Vec<(f64, f64)> = Vec::new();
    let mut skipped = 0usize;

    for &user_id in sample {
        for (item_id, actual) in matrix
            .rated_items(user_id)?
            .into_iter()
            .take(items_per_user)
        {
            let predicted = predict(user_id, item_id, matrix, similarity)?;
            if predicted > 0.0 {
                pairs.push((actual, predicted));
            } else {
                skipped += 1;
            }
        }
    }

    if pairs.is_empty() {
        return Err(EngineError::NoEvaluableData {
            users: sample.len(),
        });
    }

    let count = pairs.len() as f64;
    let squared: f64 = pairs.iter().map(|(a, p)| (a - p).powi(2)).sum();
    let absolute: f64 = pairs.iter().map(|(a, p)| (a - p).abs()).sum();

    let report = EvaluationReport {
        rmse: (squared / count).sqrt(),
        mae: absolute / count,
        evaluated_pairs: pairs.len(),
        skipped_no_signal: skipped,
        users_evaluated: sample.len(),
    };

    info!(
        users = report.users_evaluated,
        pairs = report.evaluated_pairs,
        skipped = report.skipped_no_signal,
        rmse = report.rmse,
        "Evaluation complete"
    );
    Ok(report)
}
