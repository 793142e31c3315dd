//! The `Mineget` client: one entry point per metric.
//!
//! # Example
//!
//! ```no_run
//! use mineget::{Config, IdentifierMap, Mineget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Mineget::new(&Config::default())?;
//!     let ids = IdentifierMap::new()
//!         .with("spigot", 83767u64)
//!         .with("modrinth", "huskhomes");
//!
//!     let summary = client.get(&ids).await?;
//!     println!("{} downloads", summary.total_downloads);
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::aggregate::{DownloadsReport, LatestVersionReport, PriceReport, RatingReport, Summary};
use crate::cache::Cache;
use crate::config::Config;
use crate::error::QueryError;
use crate::fetch::{CachedFetcher, Fetch, HttpFetcher};
use crate::model::{IdentifierMap, QueryResult};
use crate::query::QueryEngine;
use crate::registry::{EndpointKind, Registry};

/// Queries marketplaces and aggregates their answers.
///
/// Clones share the registry and the response cache.
#[derive(Clone)]
pub struct Mineget {
    engine: QueryEngine,
}

impl Mineget {
    /// Builds a client from configuration.
    ///
    /// Loads the built-in platforms, merges `platforms_file` over them if set,
    /// and caches responses for `cache_ttl_secs`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut registry = Registry::builtin().context("Invalid built-in platform definitions")?;
        if let Some(path) = &config.platforms_file {
            let extra = Registry::load(path)?;
            debug!(
                "Merging {} platforms from {}",
                extra.len(),
                path.display()
            );
            registry = registry.merge(extra);
        }

        let http = HttpFetcher::from_config(config).context("Failed to build HTTP client")?;
        let cache = Cache::with_ttl(Duration::from_secs(config.cache_ttl_secs));

        Ok(Self::with_parts(
            registry,
            Arc::new(CachedFetcher::new(http, cache)),
        ))
    }

    /// Builds a client from an existing registry and fetcher.
    pub fn with_parts(registry: Registry, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            engine: QueryEngine::new(Arc::new(registry), fetcher),
        }
    }

    pub fn registry(&self) -> &Registry {
        self.engine.registry()
    }

    /// Runs a raw query for one endpoint kind without aggregation.
    pub async fn query(&self, ids: &IdentifierMap, kind: EndpointKind) -> QueryResult {
        self.engine.query(ids, kind).await
    }

    pub async fn downloads(&self, ids: &IdentifierMap) -> DownloadsReport {
        DownloadsReport::from_result(self.query(ids, EndpointKind::Downloads).await)
    }

    pub async fn rating(&self, ids: &IdentifierMap) -> RatingReport {
        RatingReport::from_result(self.query(ids, EndpointKind::Rating).await)
    }

    pub async fn price(&self, ids: &IdentifierMap) -> PriceReport {
        PriceReport::from_result(self.query(ids, EndpointKind::Price).await)
    }

    /// # Errors
    ///
    /// Fails if a platform reports a publication date in an unknown format.
    pub async fn latest_version(
        &self,
        ids: &IdentifierMap,
    ) -> Result<LatestVersionReport, QueryError> {
        LatestVersionReport::from_result(self.query(ids, EndpointKind::LatestVersion).await)
    }

    pub async fn name(&self, ids: &IdentifierMap) -> QueryResult {
        self.query(ids, EndpointKind::Name).await
    }

    /// Queries all five endpoints concurrently and merges their summaries.
    ///
    /// # Errors
    ///
    /// Fails if any endpoint ends with an error status or the latest version
    /// can't be determined. No partial summary is returned.
    pub async fn get(&self, ids: &IdentifierMap) -> Result<Summary, QueryError> {
        let (downloads, rating, name, latest_version, price) = futures::try_join!(
            async { Ok::<_, QueryError>(self.downloads(ids).await) },
            async { Ok::<_, QueryError>(self.rating(ids).await) },
            async { Ok::<_, QueryError>(self.name(ids).await) },
            self.latest_version(ids),
            async { Ok::<_, QueryError>(self.price(ids).await) },
        )?;

        Summary::combine(name, downloads, rating, latest_version, price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;
    use crate::model::Status;
    use mockito::Server;
    use serde_json::json;
    use std::io::Write;

    const SPIGOT_RESOURCE: &str = "https://api.spiget.org/v2/resources/83767";
    const SPIGOT_LATEST: &str = "https://api.spiget.org/v2/resources/83767/versions/latest";
    const MODRINTH_PROJECT: &str = "https://api.modrinth.com/v2/project/huskhomes";
    const MODRINTH_VERSIONS: &str = "https://api.modrinth.com/v2/project/huskhomes/version";

    fn stub() -> StubFetcher {
        StubFetcher::new()
            .with(
                SPIGOT_RESOURCE,
                json!({
                    "name": "HuskHomes",
                    "downloads": 100,
                    "rating": {"average": 4.0, "count": 10},
                    "price": 9.99,
                    "currency": "usd"
                }),
            )
            .with(
                SPIGOT_LATEST,
                json!({"name": "4.7", "releaseDate": 1_717_200_000}),
            )
            .with(MODRINTH_PROJECT, json!({"title": "HuskHomes", "downloads": 50}))
            .with(
                MODRINTH_VERSIONS,
                json!([
                    {"version_number": "4.6.1", "date_published": "2024-01-02T00:00:00Z"},
                    {"version_number": "4.6", "date_published": "2023-11-14T00:00:00Z"}
                ]),
            )
    }

    fn client(stub: &StubFetcher) -> Mineget {
        Mineget::with_parts(
            Registry::builtin().unwrap(),
            Arc::new(CachedFetcher::new(stub.clone(), Cache::new())),
        )
    }

    fn ids() -> IdentifierMap {
        IdentifierMap::new()
            .with("spigot", 83767u64)
            .with("modrinth", "huskhomes")
    }

    #[tokio::test]
    async fn test_get_merges_every_endpoint() {
        let stub = stub();
        let summary = client(&stub).get(&ids()).await.unwrap();

        assert_eq!(summary.total_downloads, 150);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.rating_count, 10);
        assert_eq!(summary.lowest_price, 9.99);
        assert_eq!(summary.lowest_price_currency, "USD");
        // Spiget reports seconds; 2024-06-01 beats Modrinth's 2024-01-02.
        assert_eq!(summary.latest_version.as_deref(), Some("4.7"));
        assert_eq!(summary.last_updated, Some(1_717_200_000_000));
        assert_eq!(
            summary.name.get("modrinth").unwrap()["name"],
            json!("HuskHomes")
        );

        // Four of the five endpoints share the resource URL on each platform.
        assert_eq!(stub.calls_to(SPIGOT_RESOURCE), 1);
        assert_eq!(stub.calls_to(MODRINTH_PROJECT), 1);
        assert_eq!(stub.total_calls(), 4);
    }

    #[tokio::test]
    async fn test_get_fails_on_unknown_platform() {
        let stub = stub();
        let ids = ids().with("curseforge", 1234u64);

        let err = client(&stub).get(&ids).await.unwrap_err();
        match err {
            QueryError::Endpoint { message, .. } => {
                assert_eq!(message, "Unknown platform curseforge")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_fails_on_fetch_error() {
        let stub = stub().with_status(MODRINTH_VERSIONS, 500, json!(null));

        let err = client(&stub).get(&ids()).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::Endpoint {
                endpoint: EndpointKind::LatestVersion,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_fails_on_unknown_date_format() {
        let stub = stub().with(
            SPIGOT_LATEST,
            json!({"name": "4.6", "releaseDate": "14 Nov 2023"}),
        );

        let err = client(&stub).get(&ids()).await.unwrap_err();
        assert!(matches!(err, QueryError::UnrecognizedTimestamp { .. }));
    }

    #[tokio::test]
    async fn test_single_endpoint_reports() {
        let stub = stub();
        let client = client(&stub);

        let downloads = client.downloads(&ids()).await;
        assert_eq!(downloads.result.status, Status::Success);
        assert_eq!(downloads.total_downloads, 150);

        let name = client.name(&ids()).await;
        assert_eq!(
            name.endpoints.get("spigot").unwrap()["name"],
            json!("HuskHomes")
        );

        let price = client.price(&ids()).await;
        let modrinth = price.result.endpoints.get("modrinth").unwrap();
        assert_eq!(modrinth["price"], json!(0.0));
        assert_eq!(modrinth["currency"], json!("USD"));
    }

    #[tokio::test]
    async fn test_identical_queries_issue_one_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/resources/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "Example", "downloads": 42}"#)
            .expect(1)
            .create_async()
            .await;

        let definitions = format!(
            r#"
            [platforms.local]
            url = "{}/"

            [platforms.local.endpoints.downloads]
            endpoint = "resources/{{id}}"
            returns = {{ downloads = "downloads" }}

            [platforms.local.endpoints.rating]
            endpoint = "resources/{{id}}"
            returns = {{}}

            [platforms.local.endpoints.price]
            endpoint = "resources/{{id}}"
            returns = {{}}

            [platforms.local.endpoints.latest_version]
            endpoint = "resources/{{id}}"
            returns = {{}}

            [platforms.local.endpoints.name]
            endpoint = "resources/{{id}}"
            returns = {{ name = "name" }}
            "#,
            server.url()
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(definitions.as_bytes()).unwrap();

        let config = Config {
            platforms_file: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let client = Mineget::new(&config).unwrap();
        assert!(client.registry().lookup("local").is_some());
        assert!(client.registry().lookup("spigot").is_some());

        let ids = IdentifierMap::new().with("local", 7u64);
        let first = client.downloads(&ids).await;
        let second = client.downloads(&ids).await;

        assert_eq!(first.total_downloads, 42);
        assert_eq!(first, second);
        mock.assert_async().await;
    }

    #[test]
    fn test_missing_platforms_file_is_an_error() {
        let config = Config {
            platforms_file: Some("/nonexistent/platforms.toml".into()),
            ..Config::default()
        };
        assert!(Mineget::new(&config).is_err());
    }
}
