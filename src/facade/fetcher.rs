//! Cached Fetcher
//!
//! Composes the bounded store with the request coalescer: a cache hit
//! returns immediately, a miss funnels through the coalescer so that
//! concurrent misses for one key cost a single upstream call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::flight::RequestCoalescer;

// == Cache Report ==
/// Timestamped statistics snapshot for dashboards and debug logging.
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    /// Instance name supplied at construction
    pub name: String,
    /// Snapshot time
    pub captured_at: DateTime<Utc>,
    /// Store counters and gauges
    pub stats: CacheStats,
    /// Keys with a request currently pending
    pub in_flight: usize,
}

// == Cached Fetcher ==
/// A bounded store fronted by a request coalescer.
///
/// Instances are explicitly owned: construct one per use case and pass
/// it where it is needed; clones share the same store and in-flight
/// registry. Nothing here is a process-wide singleton, so tests can
/// create isolated instances freely.
pub struct CachedFetcher<T> {
    name: String,
    store: Arc<RwLock<CacheStore<T>>>,
    flights: RequestCoalescer<T>,
}

impl<T> CachedFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a fetcher over a fresh store built from `config`.
    ///
    /// The name appears in logs and reports.
    pub fn new(name: impl Into<String>, config: &CacheConfig) -> Self {
        Self::from_store(name, CacheStore::new(config))
    }

    /// Creates a fetcher whose store weighs entries with `weigher` and
    /// enforces the configured byte bound.
    pub fn with_weigher(
        name: impl Into<String>,
        config: &CacheConfig,
        weigher: impl Fn(&T) -> usize + Send + Sync + 'static,
    ) -> Self {
        Self::from_store(name, CacheStore::with_weigher(config, weigher))
    }

    fn from_store(name: impl Into<String>, store: CacheStore<T>) -> Self {
        Self {
            name: name.into(),
            store: Arc::new(RwLock::new(store)),
            flights: RequestCoalescer::new(),
        }
    }

    /// Shared handle to the underlying store, e.g. for
    /// [`spawn_cleanup_task`](crate::tasks::spawn_cleanup_task).
    pub fn store(&self) -> Arc<RwLock<CacheStore<T>>> {
        Arc::clone(&self.store)
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or fetches it through the
    /// coalescer.
    ///
    /// On a miss, concurrent callers for the same key share one
    /// invocation of `fetch`. A successful fetch is written back with
    /// `ttl` (None = store default); a write-back the store rejects for
    /// capacity reasons is logged and does not fail the call. A failed
    /// fetch is surfaced to every joined caller and never cached, so the
    /// next call retries.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        {
            let mut store = self.store.write().await;
            match store.get(key) {
                Ok(value) => {
                    debug!(cache = %self.name, key, "cache hit");
                    return Ok(value);
                }
                Err(err) if err.is_miss() => {}
                Err(err) => return Err(err),
            }
        }

        let store = Arc::clone(&self.store);
        let write_key = key.to_string();
        let cache_name = self.name.clone();
        self.flights
            .execute(key, move || async move {
                let value = fetch().await?;
                let mut store = store.write().await;
                if let Err(err) = store.set(write_key.clone(), value.clone(), ttl) {
                    // A value too large for the cache is still a valid
                    // response for the callers waiting on it.
                    warn!(cache = %cache_name, key = %write_key, %err, "write-back rejected");
                }
                Ok(value)
            })
            .await
    }

    // == Direct Store Operations ==
    /// Inserts a value directly, bypassing the coalescer.
    pub async fn insert(&self, key: &str, value: T, ttl: Option<Duration>) -> Result<()> {
        self.store.write().await.set(key.to_string(), value, ttl)
    }

    /// Returns the cached value without fetching on a miss.
    pub async fn get_cached(&self, key: &str) -> Result<T> {
        self.store.write().await.get(key)
    }

    /// Peek: true if a fresh entry exists. No recency update.
    pub async fn has(&self, key: &str) -> bool {
        self.store.read().await.has(key)
    }

    /// Removes one key. Returns whether it was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    /// Removes every resident key matching `predicate`; returns how many
    /// were removed.
    pub async fn invalidate_matching(&self, predicate: impl Fn(&str) -> bool) -> usize {
        let mut store = self.store.write().await;
        let victims: Vec<String> = store
            .keys()
            .into_iter()
            .filter(|key| predicate(key))
            .collect();
        let mut removed = 0;
        for key in &victims {
            if store.delete(key) {
                removed += 1;
            }
        }
        debug!(cache = %self.name, removed, "bulk invalidation");
        removed
    }

    /// Aborts the in-flight request for `key`, if any. Cancellation is
    /// shared: every caller joined on the key observes it.
    pub async fn abort(&self, key: &str) -> bool {
        self.flights.abort(key).await
    }

    // == Introspection ==
    /// Current store statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timestamped snapshot of statistics and in-flight count.
    pub async fn report(&self) -> CacheReport {
        CacheReport {
            name: self.name.clone(),
            captured_at: Utc::now(),
            stats: self.store.read().await.stats(),
            in_flight: self.flights.in_flight_count().await,
        }
    }
}

impl<T> Clone for CachedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            store: Arc::clone(&self.store),
            flights: self.flights.clone(),
        }
    }
}
