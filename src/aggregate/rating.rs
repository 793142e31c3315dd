use serde::Serialize;
use serde_json::Value;

use super::{coerce_f64, coerce_u64};
use crate::model::QueryResult;

/// Ratings per platform and their count-weighted average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingReport {
    #[serde(flatten)]
    pub result: QueryResult,
    /// `0.0` when no platform reported any ratings.
    pub average_rating: f64,
    pub rating_count: u64,
}

impl RatingReport {
    pub fn from_result(mut result: QueryResult) -> Self {
        let mut weighted_sum = 0.0;
        let mut rating_count: u64 = 0;

        for (_, fields) in result.endpoints.iter_mut() {
            let average = coerce_f64(fields.get("average")).unwrap_or(0.0);
            let count = coerce_u64(fields.get("count")).unwrap_or(0);
            fields.insert("average".to_string(), Value::from(average));
            fields.insert("count".to_string(), Value::from(count));

            weighted_sum += average * count as f64;
            rating_count = rating_count.saturating_add(count);
        }

        let average_rating = if rating_count == 0 {
            0.0
        } else {
            weighted_sum / rating_count as f64
        };

        Self {
            result,
            average_rating,
            rating_count,
        }
    }
}
