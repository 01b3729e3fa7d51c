//! Dependency-Tracked Cache
//!
//! Wraps a [`CachedFetcher`] with a dependency index so related entries
//! can be invalidated as a group, e.g. every response derived from one
//! user record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::facade::CachedFetcher;

// == Smart Cache ==
/// Cache facade with dependency-based bulk invalidation.
///
/// Dependency entries are pruned only by
/// [`invalidate_dependency`](Self::invalidate_dependency): keys
/// registered under a dependency that is never invalidated leave the
/// index entry behind until then. Register dependencies only for data
/// that has a real invalidation trigger.
pub struct SmartCache<T> {
    inner: CachedFetcher<T>,
    dependencies: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl<T> SmartCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Wraps an existing facade with a fresh dependency index.
    pub fn new(inner: CachedFetcher<T>) -> Self {
        Self {
            inner,
            dependencies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // == Insert With Dependencies ==
    /// Inserts a value and registers its key under each dependency.
    pub async fn insert_with_dependencies(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
        deps: &[&str],
    ) -> Result<()> {
        self.inner.insert(key, value, ttl).await?;

        let mut index = self.dependencies.write().await;
        for dep in deps {
            index
                .entry(dep.to_string())
                .or_default()
                .insert(key.to_string());
        }
        Ok(())
    }

    // == Invalidate Dependency ==
    /// Deletes every key registered under `dependency`, then clears the
    /// dependency's index entry.
    ///
    /// Returns the number of cache entries actually removed; keys that
    /// were already evicted or expired are not counted.
    pub async fn invalidate_dependency(&self, dependency: &str) -> usize {
        let keys = {
            let mut index = self.dependencies.write().await;
            index.remove(dependency).unwrap_or_default()
        };

        let mut removed = 0;
        for key in &keys {
            if self.inner.invalidate(key).await {
                removed += 1;
            }
        }

        debug!(dependency, tracked = keys.len(), removed, "invalidated dependency");
        removed
    }

    // == Delegated Reads ==
    /// Returns the cached value without fetching on a miss.
    pub async fn get_cached(&self, key: &str) -> Result<T> {
        self.inner.get_cached(key).await
    }

    /// Peek: true if a fresh entry exists.
    pub async fn has(&self, key: &str) -> bool {
        self.inner.has(key).await
    }

    /// Access to the wrapped facade for fetches and introspection.
    pub fn fetcher(&self) -> &CachedFetcher<T> {
        &self.inner
    }
}

impl<T> Clone for SmartCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            dependencies: Arc::clone(&self.dependencies),
        }
    }
}
