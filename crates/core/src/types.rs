use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type ItemId = u64;

/// A single observed rating, as produced by the data-preparation step
/// before it is pivoted into an interaction matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RatingRecord {
    pub fn new(user_id: UserId, item_id: ItemId, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
            timestamp: None,
        }
    }
}

/// A ranked candidate item. The score is aggregated similarity evidence,
/// not a calibrated rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub score: f64,
}

/// How evidence from each rated item is folded into a candidate's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAggregation {
    /// score[c] += sim(r, c)
    #[default]
    Similarity,
    /// score[c] += sim(r, c) * rating(r)
    RatingWeighted,
}

/// How the evaluation harness chooses which users to score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// First N users in the matrix's row order.
    #[default]
    Head,
    /// A reproducible random subset of N users.
    Seeded,
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_record_deserialize_without_timestamp() {
        let json = r#"{"user_id":1,"item_id":31,"rating":2.5}"#;
        let record: RatingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, RatingRecord::new(1, 31, 2.5));
    }

    #[test]
    fn test_enum_serde_names() {
        let json = serde_json::to_string(&ScoreAggregation::RatingWeighted).unwrap();
        assert_eq!(json, "\"rating_weighted\"");
        let strategy: SamplingStrategy = serde_json::from_str("\"seeded\"").unwrap();
        assert_eq!(strategy, SamplingStrategy::Seeded);
    }
}
