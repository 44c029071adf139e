use crate::error::EngineError;
use crate::types::{SamplingStrategy, ScoreAggregation, UserId};
use serde::Deserialize;
use std::path::Path;

/// Root engine configuration. Loaded from environment variables with the
/// prefix `ITEMCF__` and an optional TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// User whose recommendations are reported by the benchmark run.
    #[serde(default = "default_target_user")]
    pub target_user: Option<UserId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Below this many items the pairwise pass stays on the calling thread.
    #[serde(default = "default_parallel_min_items")]
    pub parallel_min_items: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub aggregation: ScoreAggregation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_sample_users")]
    pub sample_users: usize,
    #[serde(default = "default_items_per_user")]
    pub items_per_user: usize,
    #[serde(default)]
    pub sampling: SamplingStrategy,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

// Default functions
fn default_target_user() -> Option<UserId> {
    Some(1)
}
fn default_parallel() -> bool {
    true
}
fn default_parallel_min_items() -> usize {
    256
}
fn default_top_n() -> usize {
    5
}
fn default_sample_users() -> usize {
    50
}
fn default_items_per_user() -> usize {
    2
}
fn default_seed() -> u64 {
    42
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            parallel_min_items: default_parallel_min_items(),
        }
    }
}

impl SimilarityConfig {
    /// Single-threaded configuration, mostly useful in tests and benchmarks.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            aggregation: ScoreAggregation::default(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            sample_users: default_sample_users(),
            items_per_user: default_items_per_user(),
            sampling: SamplingStrategy::default(),
            seed: default_seed(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig::default(),
            recommend: RecommendConfig::default(),
            evaluation: EvaluationConfig::default(),
            target_user: default_target_user(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> Result<Self, EngineError> {
        Self::build(None)
    }

    /// Load configuration from an optional TOML file, overridden by
    /// environment variables.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> Result<Self, EngineError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("ITEMCF")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| EngineError::Config(e.to_string()))
    }
}
