//! HTTP access to marketplace APIs.
//!
//! The query engine only depends on the [`Fetch`] trait. [`HttpFetcher`]
//! performs real requests with reqwest, and [`CachedFetcher`] wraps any
//! fetcher with the read-through response [`Cache`](crate::Cache).
//!
//! # Example
//!
//! ```no_run
//! use mineget::fetch::{CachedFetcher, Fetch, HttpFetcher};
//! use mineget::{Cache, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = HttpFetcher::from_config(&Config::default())?;
//!     let fetcher = CachedFetcher::new(http, Cache::new());
//!
//!     let response = fetcher.fetch("https://api.spiget.org/v2/resources/83767").await?;
//!     println!("{}: {}", response.status, response.body["name"]);
//!     Ok(())
//! }
//! ```

mod cached;
mod http;

pub use cached::CachedFetcher;
pub use http::HttpFetcher;

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP status a response must have to be used.
pub const STATUS_OK: u16 = 200;

/// Status and parsed JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Value,
}

impl FetchResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: STATUS_OK,
            body,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Performs GET requests for the query engine.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches `url` and parses the body as JSON.
    ///
    /// Non-200 responses are returned, not raised; only transport failures
    /// and unparseable 200 bodies are errors.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
