//! API Module
//!
//! HTTP handlers and routing for the analytics REST API.
//!
//! # Endpoints
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/analytics/overview` - Account metrics, served through the cache
//! - `GET /api/cache/stats` - Cache statistics

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
