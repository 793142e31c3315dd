//! Per-endpoint queries across platforms.
//!
//! [`QueryEngine::query`] walks an [`IdentifierMap`] in order, fetches the
//! endpoint URL of each platform and extracts the declared fields.
//!
//! Failure policy:
//! - an unknown platform or a missing endpoint ends the query at once with an
//!   error result and no endpoints
//! - a fetch failure (transport error or non-200 status) is recorded in the
//!   message, that platform is left out, and the remaining platforms are
//!   still queried

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fetch::Fetch;
use crate::model::{Fields, IdentifierMap, QueryResult};
use crate::registry::{EndpointKind, EndpointSpec, Registry};

/// Dispatches endpoint queries to the configured platforms.
#[derive(Clone)]
pub struct QueryEngine {
    registry: Arc<Registry>,
    fetcher: Arc<dyn Fetch>,
}

impl QueryEngine {
    pub fn new(registry: Arc<Registry>, fetcher: Arc<dyn Fetch>) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Queries `kind` on every platform in `ids`.
    pub async fn query(&self, ids: &IdentifierMap, kind: EndpointKind) -> QueryResult {
        let mut result = QueryResult::success();

        for (platform, id) in ids.iter() {
            if platform.is_empty() || id.is_empty() {
                continue;
            }

            let Some(spec) = self.registry.lookup(platform) else {
                warn!("Unknown platform {}", platform);
                result.fail(format!("Unknown platform {}", platform));
                return result;
            };
            let (Some(endpoint), Some(url)) = (spec.endpoints.get(&kind), spec.url_for(kind, id))
            else {
                warn!("No endpoint {} for {}", kind, platform);
                result.fail(format!("No endpoint {} for {}", kind, platform));
                return result;
            };

            debug!("Querying {} {} for {}", platform, kind, id);
            match self.fetcher.fetch(&url).await {
                Ok(response) if response.is_ok() => {
                    result
                        .endpoints
                        .insert(platform, extract_fields(endpoint, &response.body));
                }
                Ok(response) => {
                    warn!("Querying {} returned status {}", url, response.status);
                    result.record_error(format!(
                        "Querying {} returned status {}",
                        url, response.status
                    ));
                }
                Err(e) => {
                    warn!("Error fetching {}: {}", url, e);
                    result.record_error(format!("Error fetching {}: {}", url, e));
                }
            }
        }

        result
    }
}

/// Resolves every declared field of `endpoint` against `body`.
///
/// Fields whose path doesn't resolve are present as `null`.
pub fn extract_fields(endpoint: &EndpointSpec, body: &Value) -> Fields {
    endpoint
        .returns
        .iter()
        .map(|(field, path)| (field.clone(), path.resolve(body).unwrap_or(Value::Null)))
        .collect()
}
