//! API Handlers
//!
//! HTTP request handlers for each analytics endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::config::Config;
use crate::error::{AnalyticsError, Result};
use crate::models::{bearer_token, ErrorResponse, HealthResponse, OverviewResponse, StatsResponse};
use crate::resolver::Resolver;
use crate::upstream::{AnalyticsOverview, AnalyticsSource};

/// Response header reporting how a payload was served.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

const STALE_WARNING: &str = "110 - \"Response is Stale\"";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver<AnalyticsOverview>,
}

impl AppState {
    pub fn new(resolver: Resolver<AnalyticsOverview>) -> Self {
        Self { resolver }
    }

    /// Builds the resolver and its cache from configuration.
    pub fn from_config(
        source: Arc<dyn AnalyticsSource<AnalyticsOverview>>,
        config: &Config,
    ) -> Self {
        Self::new(Resolver::from_config(source, config))
    }
}

/// Handler for GET /api/analytics/overview
///
/// Serves the caller's account metrics through the cache. The `X-Cache`
/// header carries the cache state; stale responses also carry `Warning`
/// and `Retry-After`.
pub async fn overview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let token = bearer_token(&headers).ok_or_else(|| {
        AnalyticsError::Unauthenticated("missing bearer access token".to_string())
    })?;

    let resolution = state.resolver.resolve(&token).await?;

    let mut response = Json(OverviewResponse::from(&resolution)).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(X_CACHE, HeaderValue::from_static(resolution.state.as_str()));

    if resolution.is_stale() {
        response_headers.insert(header::WARNING, HeaderValue::from_static(STALE_WARNING));
        if let Some(secs) = resolution.retry_after() {
            response_headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
    }

    Ok(response)
}

/// Handler for GET /api/cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.resolver.cache().read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Fallback for unknown routes.
pub async fn not_found_handler(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Endpoint not found").with_path(uri.path())),
    )
}
