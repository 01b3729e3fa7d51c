//! Configuration Module
//!
//! Cache sizing and TTL policy, loadable from environment variables and
//! pre-tuned for the common facade use cases.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// Build one with the `with_*` methods, load one from the environment, or
/// start from a named preset matching the data's volatility.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Cumulative byte bound across all entries, None = unbounded by size.
    /// Only enforced when the store is built with a weigher.
    pub max_bytes: Option<usize>,
    /// TTL applied to entries set without an explicit TTL.
    /// None = such entries never expire.
    pub default_ttl: Option<Duration>,
    /// Background cleanup task interval
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    // == Builders ==
    /// Sets the entry count bound. Clamped to at least 1.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        self
    }

    /// Sets the cumulative byte bound.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Sets the TTL applied when `set` is called without one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Disables the default TTL; entries set without an explicit TTL
    /// never expire.
    pub fn without_default_ttl(mut self) -> Self {
        self.default_ttl = None;
        self
    }

    /// Sets the background cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    // == Environment ==
    /// Creates a config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HERDCACHE_MAX_ENTRIES` - entry count bound (default: 1000)
    /// - `HERDCACHE_MAX_BYTES` - cumulative byte bound, 0 disables it (default: disabled)
    /// - `HERDCACHE_DEFAULT_TTL_MS` - default TTL in milliseconds, 0 disables it (default: 300000)
    /// - `HERDCACHE_CLEANUP_INTERVAL_MS` - cleanup frequency in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let max_bytes = env::var("HERDCACHE_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0);
        let default_ttl_ms = env::var("HERDCACHE_DEFAULT_TTL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300_000);

        Self {
            max_entries: env::var("HERDCACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|v| v.max(1))
                .unwrap_or(1000),
            max_bytes,
            default_ttl: if default_ttl_ms > 0 {
                Some(Duration::from_millis(default_ttl_ms))
            } else {
                None
            },
            cleanup_interval: Duration::from_millis(
                env::var("HERDCACHE_CLEANUP_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }

    // == Facade Presets ==
    /// Generic API GET responses: medium capacity, 5 minute TTL.
    pub fn api_responses() -> Self {
        Self::new()
            .with_max_entries(500)
            .with_default_ttl(Duration::from_secs(300))
    }

    /// Authorization decisions: volatile, 60 second TTL.
    pub fn auth_decisions() -> Self {
        Self::new()
            .with_max_entries(1000)
            .with_default_ttl(Duration::from_secs(60))
    }

    /// Large objects: few entries, 50 MB byte bound, 10 minute TTL.
    ///
    /// Meant to be paired with a weigher, e.g.
    /// [`json_weigher`](crate::facade::json_weigher).
    pub fn large_objects() -> Self {
        Self::new()
            .with_max_entries(100)
            .with_max_bytes(50 * 1024 * 1024)
            .with_default_ttl(Duration::from_secs(600))
    }

    /// Short-lived values: small capacity, 5 second TTL.
    pub fn short_lived() -> Self {
        Self::new()
            .with_max_entries(200)
            .with_default_ttl(Duration::from_secs(5))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_bytes: None,
            default_ttl: Some(Duration::from_secs(300)),
            cleanup_interval: Duration::from_secs(1),
        }
    }
}
