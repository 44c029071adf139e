use crate::types::{ItemId, UserId};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Interaction matrix has no users or no items")]
    EmptyMatrix,

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("No evaluable predictions across {users} sampled users")]
    NoEvaluableData { users: usize },

    #[error("Matrix shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Duplicate user id: {0}")]
    DuplicateUser(UserId),

    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),

    #[error("Invalid rating {value} for user {user_id}, item {item_id}")]
    InvalidRating {
        user_id: UserId,
        item_id: ItemId,
        value: f64,
    },

    #[error("Conflicting ratings for user {user_id}, item {item_id}: {first} vs {second}")]
    ConflictingRating {
        user_id: UserId,
        item_id: ItemId,
        first: f64,
        second: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
