//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, expirations
//! and rejected inserts, plus entry/byte gauges and configured bounds.

use serde::Serialize;

// == Cache Stats ==
/// Cache performance counters and capacity gauges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Number of inserts rejected by the byte bound
    pub rejected: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Cumulative weighed size of resident entries, 0 without a weigher
    pub total_bytes: usize,
    /// Configured entry count bound
    pub max_entries: usize,
    /// Configured byte bound, None = unbounded by size
    pub max_bytes: Option<usize>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates stats with all counters at zero and the given bounds.
    pub fn new(max_entries: usize, max_bytes: Option<usize>) -> Self {
        Self {
            max_entries,
            max_bytes,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Rejection ==
    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    // == Update Gauges ==
    /// Updates the entry and byte gauges.
    pub fn set_totals(&mut self, entries: usize, bytes: usize) {
        self.total_entries = entries;
        self.total_bytes = bytes;
    }
}
