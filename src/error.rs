//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and coalescing layers.
///
/// The enum is `Clone` because a single in-flight outcome is shared with
/// every caller joined on the same key.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid cache key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Entry larger than the configured byte bound
    #[error("Entry too large for cache: {0}")]
    EntryTooLarge(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// In-flight request was aborted
    #[error("Request aborted: {0}")]
    Aborted(String),

    /// Failure reported by an upstream request function
    #[error("Upstream request failed: {0}")]
    Upstream(Arc<anyhow::Error>),
}

impl CacheError {
    /// True for the two outcomes a cache read treats as a miss.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        CacheError::Upstream(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;
