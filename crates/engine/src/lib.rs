//! Item-based collaborative filtering: item-item cosine similarity,
//! top-N recommendation, rating prediction, and an RMSE benchmark harness.

pub mod engine;
pub mod evaluate;
pub mod matrix;
pub mod pipeline;
pub mod predict;
pub mod recommend;
pub mod similarity;

pub use engine::ItemCfEngine;
pub use evaluate::{evaluate, evaluate_report, EvaluationReport, UserSample};
pub use matrix::InteractionMatrix;
pub use pipeline::{run_benchmark, BenchmarkReport};
pub use predict::predict;
pub use recommend::{recommend, recommend_with};
pub use similarity::{compute_similarity, compute_similarity_with, SimilarityMatrix};
