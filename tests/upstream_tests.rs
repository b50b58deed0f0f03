//! Integration Tests for the Twitter adapter
//!
//! Runs the reqwest-backed source against a local axum server that mimics
//! the upstream `users/me` endpoint.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use analytics_cache::{
    api::create_router, cache::TtlCache, AnalyticsOverview, AnalyticsSource, AppState, CacheState,
    Resolver, TwitterSource, UpstreamError,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

// == Fake Upstream ==

/// Behaviour is selected by the bearer token.
async fn users_me(State(calls): State<Arc<AtomicUsize>>, headers: HeaderMap) -> Response {
    calls.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    let now = chrono::Utc::now().timestamp();
    match token.as_str() {
        "ok" => Json(json!({
            "data": {
                "id": "42",
                "name": "LazAI",
                "username": "LazAINetwork",
                "most_recent_tweet_id": "1790",
                "public_metrics": {
                    "followers_count": 12847,
                    "following_count": 321,
                    "tweet_count": 940,
                    "listed_count": 12
                }
            },
            "includes": {
                "tweets": [{
                    "id": "1790",
                    "text": "Shipping today",
                    "created_at": "2024-05-14T09:30:00.000Z",
                    "public_metrics": {"like_count": 31, "retweet_count": 4, "reply_count": 2, "quote_count": 1}
                }]
            }
        }))
        .into_response(),
        "unauthorized" => StatusCode::UNAUTHORIZED.into_response(),
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "limited" => (
            StatusCode::TOO_MANY_REQUESTS,
            [("x-rate-limit-reset", (now + 45).to_string())],
        )
            .into_response(),
        "limited-past" => (
            StatusCode::TOO_MANY_REQUESTS,
            [("x-rate-limit-reset", (now - 30).to_string())],
        )
            .into_response(),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
    }
}

async fn spawn_fake_upstream() -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/2/users/me", get(users_me))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), calls)
}

// == Adapter Tests ==

#[tokio::test]
async fn test_fetch_success() {
    let (base_url, calls) = spawn_fake_upstream().await;
    let source = TwitterSource::new(base_url);

    let overview = source.fetch("ok").await.unwrap();

    assert_eq!(overview.username, "LazAINetwork");
    assert_eq!(overview.followers_count, 12847);
    assert_eq!(overview.recent_activity.len(), 1);
    assert_eq!(overview.recent_activity[0].content, "Shipping today");
    assert_eq!(overview.recent_activity[0].engagement, 38);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_classifies_failures() {
    let (base_url, calls) = spawn_fake_upstream().await;
    let source = TwitterSource::new(base_url);

    assert_eq!(
        source.fetch("unauthorized").await.unwrap_err(),
        UpstreamError::Unauthorized
    );
    assert_eq!(source.fetch("missing").await.unwrap_err(), UpstreamError::NotFound);

    let err = source.fetch("down").await.unwrap_err();
    assert_eq!(err.status_code(), 503);

    let err = source.fetch("garbled").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Other { .. }));

    // One network call per fetch, never retried.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_fetch_rate_limit_uses_reset_header() {
    let (base_url, _calls) = spawn_fake_upstream().await;
    let source = TwitterSource::new(base_url);

    let retry_after = source.fetch("limited").await.unwrap_err().retry_after().unwrap();

    // Second-granularity clocks on both sides.
    assert!((44..=46).contains(&retry_after), "retry_after = {}", retry_after);
}

#[tokio::test]
async fn test_fetch_rate_limit_past_reset_uses_floor() {
    let (base_url, _calls) = spawn_fake_upstream().await;
    let source = TwitterSource::new(base_url).with_retry_after_floor(90);

    let err = source.fetch("limited-past").await.unwrap_err();

    assert_eq!(err, UpstreamError::RateLimited { retry_after: 90 });
}

#[tokio::test]
async fn test_fetch_transport_failure() {
    // Nothing listens on port 9 of localhost in the test environment.
    let source = TwitterSource::new("http://127.0.0.1:9");

    let err = source.fetch("ok").await.unwrap_err();

    assert!(matches!(err, UpstreamError::Other { status: None, .. }));
    assert_eq!(err.status_code(), 500);
}

// == End-to-End ==

#[tokio::test]
async fn test_resolver_over_real_adapter() {
    let (base_url, calls) = spawn_fake_upstream().await;
    let source = Arc::new(TwitterSource::new(base_url));
    let resolver: Resolver<AnalyticsOverview> = Resolver::new(
        source,
        TtlCache::new(10, std::time::Duration::from_secs(60)),
        None,
    );

    assert_eq!(resolver.resolve("ok").await.unwrap().state, CacheState::Miss);
    assert_eq!(resolver.resolve("ok").await.unwrap().state, CacheState::Hit);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The router accepts the same resolver.
    let _router = create_router(AppState::new(resolver), "http://localhost:3000");
}
