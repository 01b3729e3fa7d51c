//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, TTL
//! expiration and optional byte-size accounting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Size calculation function applied to every stored value.
pub type Weigher<T> = Arc<dyn Fn(&T) -> usize + Send + Sync>;

// == Cache Store ==
/// Cache storage with LRU eviction, TTL expiration and optional byte
/// bounds.
///
/// The byte bound is only enforced when the store is built with a
/// weigher; without one, only the entry count bound applies.
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Cumulative byte bound, None = unbounded by size
    max_bytes: Option<usize>,
    /// Cumulative weighed size of resident entries
    total_bytes: usize,
    /// TTL applied to entries set without one, None = no expiry
    default_ttl: Option<Duration>,
    /// Size calculation for stored values
    weigher: Option<Weigher<T>>,
}

impl<T: Clone> CacheStore<T> {
    // == Constructors ==
    /// Creates a new CacheStore from the given configuration.
    ///
    /// The configured byte bound is ignored until a weigher is supplied,
    /// see [`with_weigher`](Self::with_weigher).
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(config.max_entries, config.max_bytes),
            max_entries: config.max_entries,
            max_bytes: config.max_bytes,
            total_bytes: 0,
            default_ttl: config.default_ttl,
            weigher: None,
        }
    }

    /// Creates a store that weighs every value with `weigher` and
    /// enforces the configured byte bound against the cumulative weight.
    pub fn with_weigher(
        config: &CacheConfig,
        weigher: impl Fn(&T) -> usize + Send + Sync + 'static,
    ) -> Self {
        let mut store = Self::new(config);
        store.weigher = Some(Arc::new(weigher));
        store
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and TTL is
    /// reset. Least-recently-used entries (never the new one) are evicted
    /// until both the count bound and the byte bound are satisfied, even
    /// if one large insert evicts several entries.
    ///
    /// TTL contract: `None` applies the store's default TTL; a store
    /// default of `None` means the entry never expires. An explicit zero
    /// `Duration` produces an entry that is already expired.
    ///
    /// An entry whose own weighed size exceeds the byte bound is rejected
    /// and the cache left unchanged.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the store default if None)
    pub fn set(&mut self, key: String, value: T, ttl: Option<Duration>) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let size = self.weigher.as_ref().map(|weigh| weigh(&value));

        // A value that cannot fit even into an empty cache is rejected
        // rather than evicting everything else for nothing.
        if let (Some(max_bytes), Some(size)) = (self.max_bytes, size) {
            if size > max_bytes {
                warn!(key = %key, size, max_bytes, "rejecting entry larger than byte bound");
                self.stats.record_rejection();
                return Err(CacheError::EntryTooLarge(key));
            }
        }

        // Reclaim expired entries before enforcing bounds against live data.
        self.cleanup_expired();

        // Overwrite: drop the old entry first so the bounds see the final state.
        if let Some(old) = self.entries.remove(&key) {
            self.lru.remove(&key);
            self.total_bytes = self.total_bytes.saturating_sub(old.size.unwrap_or(0));
        }

        // Count bound
        while self.entries.len() >= self.max_entries {
            if !self.evict_lru() {
                return Err(CacheError::CacheFull(
                    "cache is full and eviction failed".to_string(),
                ));
            }
        }

        // Byte bound: evict until the new entry fits
        if let (Some(max_bytes), Some(size)) = (self.max_bytes, size) {
            while self.total_bytes.saturating_add(size) > max_bytes {
                if !self.evict_lru() {
                    break;
                }
            }
        }

        let entry = CacheEntry::new(value, ttl.or(self.default_ttl), size);
        self.total_bytes = self.total_bytes.saturating_add(size.unwrap_or(0));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.sync_gauges();

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, updating its recency.
    ///
    /// Expired entries are removed as a side effect and reported as
    /// [`CacheError::Expired`]; both outcomes count as a miss.
    pub fn get(&mut self, key: &str) -> Result<T> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                let size = entry.size.unwrap_or(0);
                self.entries.remove(key);
                self.lru.remove(key);
                self.total_bytes = self.total_bytes.saturating_sub(size);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.sync_gauges();
                debug!(key, "entry expired on read");
                return Err(CacheError::Expired(key.to_string()));
            }

            let value = entry.value.clone();
            self.stats.record_hit();
            self.lru.touch(key);
            Ok(value)
        } else {
            self.stats.record_miss();
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Has ==
    /// Existence check with peek semantics: recency, statistics and the
    /// entry itself are left untouched; an expired entry reads as absent.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        if let Some(entry) = self.entries.remove(key) {
            self.lru.remove(key);
            self.total_bytes = self.total_bytes.saturating_sub(entry.size.unwrap_or(0));
            self.sync_gauges();
            true
        } else {
            false
        }
    }

    // == Keys ==
    /// Snapshot of currently resident, non-expired keys.
    ///
    /// Used for pattern-based bulk invalidation; the snapshot is not
    /// invalidated by later mutations.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_totals(self.entries.len(), self.total_bytes);
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.lru.remove(&key);
                self.total_bytes = self.total_bytes.saturating_sub(entry.size.unwrap_or(0));
                self.stats.record_expiration();
            }
        }

        self.sync_gauges();
        count
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Evict LRU ==
    /// Evicts the least recently used entry. Returns false when there is
    /// nothing left to evict.
    fn evict_lru(&mut self) -> bool {
        let Some(victim) = self.lru.evict_oldest() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&victim) {
            self.total_bytes = self.total_bytes.saturating_sub(entry.size.unwrap_or(0));
        }
        self.stats.record_eviction();
        debug!(key = %victim, "evicted least recently used entry");
        true
    }

    fn sync_gauges(&mut self) {
        self.stats.set_totals(self.entries.len(), self.total_bytes);
    }
}

impl<T> std::fmt::Debug for CacheStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}
