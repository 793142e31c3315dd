use serde::Serialize;

use super::{DownloadsReport, LatestVersionReport, PriceReport, RatingReport};
use crate::error::QueryError;
use crate::model::{Endpoints, QueryResult};
use crate::registry::EndpointKind;

/// Every metric of a resource in one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub name: Endpoints,
    pub downloads: Endpoints,
    pub ratings: Endpoints,
    pub version: Endpoints,
    pub price: Endpoints,
    pub total_downloads: u64,
    pub average_rating: f64,
    pub rating_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    pub lowest_price: f64,
    pub lowest_price_currency: String,
}

impl Summary {
    /// Merges the five reports, failing if any of them has an error status.
    ///
    /// Reports are checked in endpoint order, so the first failing endpoint
    /// is the one named in the error.
    pub fn combine(
        name: QueryResult,
        downloads: DownloadsReport,
        rating: RatingReport,
        latest_version: LatestVersionReport,
        price: PriceReport,
    ) -> Result<Self, QueryError> {
        let results = [
            (EndpointKind::Downloads, &downloads.result),
            (EndpointKind::Rating, &rating.result),
            (EndpointKind::Price, &price.result),
            (EndpointKind::LatestVersion, &latest_version.result),
            (EndpointKind::Name, &name),
        ];
        if let Some((endpoint, failed)) = results.iter().find(|(_, r)| !r.is_success()) {
            return Err(QueryError::Endpoint {
                endpoint: *endpoint,
                message: failed.message.clone().unwrap_or_default(),
            });
        }

        Ok(Self {
            name: name.endpoints,
            downloads: downloads.result.endpoints,
            ratings: rating.result.endpoints,
            version: latest_version.result.endpoints,
            price: price.result.endpoints,
            total_downloads: downloads.total_downloads,
            average_rating: rating.average_rating,
            rating_count: rating.rating_count,
            latest_version: latest_version.latest_version,
            last_updated: latest_version.latest_version_published,
            lowest_price: price.lowest_price,
            lowest_price_currency: price.lowest_price_currency,
        })
    }
}
