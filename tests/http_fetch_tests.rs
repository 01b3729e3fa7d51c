//! Integration Tests over HTTP
//!
//! Runs the facade against a local HTTP server to verify coalescing,
//! caching and failure behavior with a real network round-trip.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use herdcache::facade::request_key;
use herdcache::{CacheConfig, CachedFetcher};

// == Test Server ==

#[derive(Clone)]
struct ServerState {
    served: Arc<AtomicUsize>,
}

async fn course_handler(
    State(state): State<ServerState>,
    Path(id): Path<u32>,
) -> Json<Value> {
    state.served.fetch_add(1, Ordering::SeqCst);
    // Slow enough for concurrent callers to overlap
    tokio::time::sleep(Duration::from_millis(50)).await;
    Json(json!({ "id": id, "title": format!("Course {}", id) }))
}

async fn unstable_handler(State(state): State<ServerState>) -> (StatusCode, &'static str) {
    state.served.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream down")
}

/// Starts a throwaway server on an ephemeral port. Returns its base URL
/// and the request counter.
async fn start_server() -> (String, Arc<AtomicUsize>) {
    let served = Arc::new(AtomicUsize::new(0));
    let state = ServerState {
        served: served.clone(),
    };
    let app = Router::new()
        .route("/courses/:id", get(course_handler))
        .route("/unstable", get(unstable_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), served)
}

fn fetch_json(
    url: String,
) -> impl FnOnce() -> std::pin::Pin<
    Box<dyn std::future::Future<Output = anyhow::Result<Value>> + Send>,
> {
    move || {
        Box::pin(async move {
            let response = reqwest::get(&url).await?;
            let value = response.error_for_status()?.json::<Value>().await?;
            Ok(value)
        })
    }
}

// == Tests ==

#[tokio::test]
async fn test_concurrent_fetches_hit_server_once() {
    let (base, served) = start_server().await;
    let fetcher: CachedFetcher<Value> =
        CachedFetcher::new("api", &CacheConfig::api_responses());

    let key = request_key("/courses/7", &[]);
    let url = format!("{}/courses/7", base);

    let (a, b) = tokio::join!(
        fetcher.get_or_fetch(&key, None, fetch_json(url.clone())),
        fetcher.get_or_fetch(&key, None, fetch_json(url.clone())),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a["id"], 7);
    assert_eq!(a, b);
    assert_eq!(served.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cache_hit_skips_the_network() {
    let (base, served) = start_server().await;
    let fetcher: CachedFetcher<Value> =
        CachedFetcher::new("api", &CacheConfig::api_responses());

    let key = request_key("/courses/3", &[]);
    let url = format!("{}/courses/3", base);

    fetcher
        .get_or_fetch(&key, None, fetch_json(url.clone()))
        .await
        .unwrap();
    let cached = fetcher
        .get_or_fetch(&key, None, fetch_json(url.clone()))
        .await
        .unwrap();

    assert_eq!(cached["id"], 3);
    assert_eq!(served.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.stats().await.hits, 1);
}

#[tokio::test]
async fn test_expired_entry_goes_back_to_the_server() {
    let (base, served) = start_server().await;
    let fetcher: CachedFetcher<Value> =
        CachedFetcher::new("quick", &CacheConfig::short_lived());

    let key = request_key("/courses/9", &[]);
    let url = format!("{}/courses/9", base);
    let ttl = Some(Duration::from_millis(100));

    fetcher
        .get_or_fetch(&key, ttl, fetch_json(url.clone()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    fetcher
        .get_or_fetch(&key, ttl, fetch_json(url.clone()))
        .await
        .unwrap();

    assert_eq!(served.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_upstream_failure_is_not_cached() {
    let (base, served) = start_server().await;
    let fetcher: CachedFetcher<Value> =
        CachedFetcher::new("api", &CacheConfig::api_responses());

    let key = request_key("/unstable", &[]);
    let url = format!("{}/unstable", base);

    let first = fetcher.get_or_fetch(&key, None, fetch_json(url.clone())).await;
    assert!(first.is_err());
    assert!(!fetcher.has(&key).await);

    // The failed response was not retained; the retry reaches the server
    let second = fetcher.get_or_fetch(&key, None, fetch_json(url.clone())).await;
    assert!(second.is_err());
    assert_eq!(served.load(Ordering::SeqCst), 2);
}
