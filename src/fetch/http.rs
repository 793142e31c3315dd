use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{Fetch, FetchResponse, STATUS_OK};
use crate::config::Config;
use crate::error::FetchError;

/// Fetcher backed by a reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client with the configured user agent and timeout.
    ///
    /// GitHub rejects requests without a user agent, so one is always set.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!("GET {} returned {} ({} bytes)", url, status, bytes.len());

        let body = match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => body,
            Err(source) if status == STATUS_OK => {
                return Err(FetchError::InvalidJson {
                    url: url.to_string(),
                    source,
                })
            }
            // Error pages are often HTML; the status is what matters.
            Err(_) => Value::Null,
        };

        Ok(FetchResponse { status, body })
    }
}
