//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// Sweeping is a memory optimization: expired entries are already
/// invisible to readers, the sweeper just reclaims them between
/// accesses. The task runs in an infinite loop, sleeping for the given
/// interval between sweeps and taking a write lock for each one.
///
/// # Arguments
/// * `cache` - shared handle to the store, e.g. from [`CachedFetcher::store`](crate::facade::CachedFetcher::store)
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during shutdown.
///
/// # Example
/// ```ignore
/// let fetcher = CachedFetcher::new("api", &CacheConfig::api_responses());
/// let handle = spawn_cleanup_task(fetcher.store(), Duration::from_secs(1));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<T>(
    cache: Arc<RwLock<CacheStore<T>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting TTL cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store = cache.write().await;
                store.cleanup_expired()
            };

            if removed > 0 {
                info!(removed, "TTL cleanup removed expired entries");
            } else {
                debug!("TTL cleanup found no expired entries");
            }
        }
    })
}
