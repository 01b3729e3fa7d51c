//! Request Coalescer
//!
//! Tracks one in-flight request per key and shares its outcome with
//! every caller that joins while it is pending.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

// == In-Flight Record ==
/// Bookkeeping for one pending upstream request.
struct InFlight<T> {
    /// Publishes the settled outcome to every joined caller
    tx: broadcast::Sender<Result<T>>,
    /// Handle of the detached task driving the request
    handle: JoinHandle<()>,
}

// == Request Coalescer ==
/// Ensures at most one outstanding upstream request per key.
///
/// The first caller for a key spawns the request as a detached task, so
/// it runs to completion even if every caller stops waiting. Callers
/// arriving while the request is pending receive the same outcome,
/// success or failure. The in-flight record is removed before the
/// outcome is published, so a caller arriving after settlement always
/// starts a fresh request.
///
/// Failures are never retained: the next call for the same key invokes
/// the request function again.
///
/// Clones share the same in-flight registry.
pub struct RequestCoalescer<T> {
    in_flight: Arc<Mutex<HashMap<String, InFlight<T>>>>,
}

impl<T> RequestCoalescer<T>
where
    T: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a new coalescer with an empty in-flight registry.
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Execute ==
    /// Runs `request_fn` for `key`, or joins the request already in
    /// flight for it.
    ///
    /// The key must be derived deterministically from the request
    /// inputs: two calls meant to be the same logical request must
    /// produce the same key. The coalescer cannot detect violations of
    /// this contract.
    ///
    /// `request_fn` must report failure through `Err` rather than
    /// panicking; a panicking future leaves the key marked in flight
    /// until [`abort`](Self::abort) clears it.
    ///
    /// No timeout is applied. A hung upstream leaves its key in flight
    /// indefinitely; callers wanting a deadline wrap the request in
    /// `tokio::time::timeout` inside `request_fn`.
    pub async fn execute<F, Fut>(&self, key: &str, request_fn: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let mut rx = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(flight) = in_flight.get(key) {
                debug!(key, "joining in-flight request");
                flight.tx.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                let request = request_fn();
                let registry = Arc::clone(&self.in_flight);
                let flight_key = key.to_string();
                let publish = tx.clone();
                let handle = tokio::spawn(async move {
                    let outcome = request.await.map_err(CacheError::from);
                    // Drop the record first: a caller that observes the
                    // settled outcome must never rejoin this flight.
                    registry.lock().await.remove(&flight_key);
                    let _ = publish.send(outcome);
                });
                in_flight.insert(key.to_string(), InFlight { tx, handle });
                debug!(key, "started upstream request");
                rx
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // The channel closes without a send only when the driving
            // task was aborted.
            Err(_) => Err(CacheError::Aborted(key.to_string())),
        }
    }

    // == Abort ==
    /// Aborts the in-flight request for `key`, if any.
    ///
    /// The request is shared, so aborting cancels it for every joined
    /// caller; each of them observes [`CacheError::Aborted`]. A single
    /// caller cannot cancel only its own share.
    pub async fn abort(&self, key: &str) -> bool {
        if let Some(flight) = self.in_flight.lock().await.remove(key) {
            flight.handle.abort();
            warn!(key, "aborted in-flight request");
            true
        } else {
            false
        }
    }

    // == Introspection ==
    /// True if a request for `key` is currently pending.
    pub async fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.lock().await.contains_key(key)
    }

    /// Number of distinct keys currently in flight.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

impl<T> Default for RequestCoalescer<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RequestCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}
