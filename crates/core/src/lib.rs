pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use types::{ItemId, RatingRecord, Recommendation, ScoreAggregation, UserId};
