//! API Routes
//!
//! Configures the Axum router with all analytics endpoints.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{
    health_handler, not_found_handler, overview_handler, stats_handler, AppState, X_CACHE,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/health` - Health check
/// - `GET /api/analytics/overview` - Cached account metrics for the bearer identity
/// - `GET /api/cache/stats` - Cache diagnostics
///
/// # Middleware
/// - CORS: restricted to `frontend_url`, any origin if it is not a valid header value
/// - Tracing: logs all requests
pub fn create_router(state: AppState, frontend_url: &str) -> Router {
    let origin = match HeaderValue::from_str(frontend_url) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!("Invalid FRONTEND_URL {:?}, allowing any origin", frontend_url);
            AllowOrigin::from(Any)
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([X_CACHE, header::RETRY_AFTER, header::WARNING]);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/analytics/overview", get(overview_handler))
        .route("/api/cache/stats", get(stats_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
