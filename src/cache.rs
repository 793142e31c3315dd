//! In-memory caching for API responses.
//!
//! This module provides a URL-keyed cache with TTL (time-to-live) support.
//! Marketplace responses change slowly, and one `get` call asks the same
//! resource URL for several metrics, so successful bodies are kept for a
//! short window (10 minutes by default).
//!
//! The cache is cheap to clone; clones share the same entries.
//!
//! # Example
//!
//! ```
//! use mineget::Cache;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache = Cache::new();
//!
//! // Store a response body
//! cache.set("https://api.spiget.org/v2/resources/1", json!({"downloads": 5})).await;
//!
//! // Retrieve it later (within TTL)
//! let body = cache.get("https://api.spiget.org/v2/resources/1").await;
//! assert_eq!(body, Some(json!({"downloads": 5})));
//! # }
//! ```

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::trace;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

struct CacheEntry {
    body: Value,
    stored: Instant,
}

/// An in-memory response cache with TTL support.
///
/// Entries expire once they are older than the TTL and are replaced on the
/// next store for the same URL.
#[derive(Clone)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Cache {
    /// Creates a new cache with the default 10-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    /// Creates a new cache with a custom TTL.
    ///
    /// A zero TTL disables caching: every lookup misses.
    ///
    /// # Example
    ///
    /// ```
    /// use mineget::Cache;
    /// use std::time::Duration;
    ///
    /// // Cache that expires after 1 minute
    /// let cache = Cache::with_ttl(Duration::from_secs(60));
    /// assert_eq!(cache.ttl(), Duration::from_secs(60));
    /// ```
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Retrieves the body cached for `url`.
    ///
    /// Returns `None` if the URL was never stored or the entry has expired.
    pub async fn get(&self, url: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(url)?;

        if entry.stored.elapsed() >= self.ttl {
            trace!("Cache entry expired for URL: {}", url);
            return None;
        }

        trace!("Cache hit for URL: {}", url);
        Some(entry.body.clone())
    }

    /// Stores a response body for `url`.
    pub async fn set(&self, url: impl Into<String>, body: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(
            url.into(),
            CacheEntry {
                body,
                stored: Instant::now(),
            },
        );
    }

    /// Clears all cached entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cache_hit() {
        let cache = Cache::new();
        cache.set("https://example.com/a", json!({"x": 1})).await;

        assert_eq!(cache.get("https://example.com/a").await, Some(json!({"x": 1})));
        assert_eq!(cache.get("https://example.com/b").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_hits() {
        let cache = Cache::with_ttl(Duration::ZERO);
        cache.set("https://example.com/a", json!(1)).await;

        assert_eq!(cache.get("https://example.com/a").await, None);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = Cache::with_ttl(Duration::from_millis(20));
        cache.set("https://example.com/a", json!(1)).await;
        assert!(cache.get("https://example.com/a").await.is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("https://example.com/a").await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = Cache::new();
        let clone = cache.clone();
        clone.set("https://example.com/a", json!(1)).await;

        assert_eq!(cache.get("https://example.com/a").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = Cache::new();
        cache.set("https://example.com/a", json!(1)).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(Cache::default().ttl(), Duration::from_secs(600));
    }
}
