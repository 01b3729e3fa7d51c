//! Herdcache - a request-coalescing in-memory cache
//!
//! Provides TTL expiration, LRU eviction, byte-size bounds and per-key
//! coalescing of concurrent upstream requests.

pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod flight;
pub mod tasks;

pub use cache::{CacheStats, CacheStore};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use facade::{CachedFetcher, SmartCache};
pub use flight::RequestCoalescer;
pub use tasks::spawn_cleanup_task;
