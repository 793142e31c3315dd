use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

use super::{Fetch, FetchResponse};
use crate::cache::Cache;
use crate::error::FetchError;

/// Read-through caching wrapper around another fetcher.
///
/// Only 200 responses are cached. Concurrent requests for the same URL wait
/// for the first one instead of all going to the network.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Cache,
    in_flight: InFlight,
}

type InFlight = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Removes a URL's in-flight entry once the last caller waiting on it
/// finishes or is cancelled.
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    url: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // Held by the map and this guard only: no one else is waiting.
        let last = in_flight
            .get(self.url)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock))
            && Arc::strong_count(&self.lock) == 2;
        if last {
            in_flight.remove(self.url);
        }
    }
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F, cache: Cache) -> Self {
        Self {
            inner,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl<F: Fetch> Fetch for CachedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        if let Some(body) = self.cache.get(url).await {
            return Ok(FetchResponse::ok(body));
        }

        let lock = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_default()
            .clone();
        let entry = InFlightGuard {
            in_flight: &self.in_flight,
            url,
            lock,
        };
        let _turn = entry.lock.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(body) = self.cache.get(url).await {
            return Ok(FetchResponse::ok(body));
        }

        trace!("Cache miss for URL: {}", url);
        let result = self.inner.fetch(url).await;

        if let Ok(response) = &result {
            if response.is_ok() {
                self.cache.set(url, response.body.clone()).await;
            }
        }

        result
    }
}
