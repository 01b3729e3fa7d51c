//! Facade Module
//!
//! Pre-configured store + coalescer compositions with deterministic key
//! derivation. Pick the [`CacheConfig`](crate::config::CacheConfig)
//! preset matching the data's volatility:
//!
//! - `api_responses()` for generic API GET responses
//! - `auth_decisions()` for authorization checks
//! - `large_objects()` for size-bounded JSON objects
//! - `short_lived()` for quick, volatile values

mod fetcher;
mod key;
mod smart;

pub use fetcher::{CacheReport, CachedFetcher};
pub use key::{auth_key, object_key, request_key};
pub use smart::SmartCache;

use serde_json::Value;

/// Weigher for JSON values: the length of the serialized representation.
///
/// Pair with [`CacheConfig::large_objects`](crate::config::CacheConfig::large_objects):
///
/// ```ignore
/// let cache = CachedFetcher::with_weigher("large", &CacheConfig::large_objects(), json_weigher);
/// ```
pub fn json_weigher(value: &Value) -> usize {
    value.to_string().len()
}
