use serde::Serialize;
use serde_json::Value;

use super::coerce_u64;
use crate::model::QueryResult;

/// Downloads per platform and their sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadsReport {
    #[serde(flatten)]
    pub result: QueryResult,
    pub total_downloads: u64,
}

impl DownloadsReport {
    pub fn from_result(mut result: QueryResult) -> Self {
        let mut total_downloads: u64 = 0;

        for (_, fields) in result.endpoints.iter_mut() {
            let downloads = coerce_u64(fields.get("downloads")).unwrap_or(0);
            fields.insert("downloads".to_string(), Value::from(downloads));
            total_downloads = total_downloads.saturating_add(downloads);
        }

        Self {
            result,
            total_downloads,
        }
    }
}
