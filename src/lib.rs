//! Analytics Cache - resilient access to a rate-limited analytics API
//!
//! Serves per-identity analytics from a TTL cache, falls back to stale
//! entries while upstream is rate limited, and paces dashboard calls per
//! endpoint.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod tasks;
pub mod throttle;
pub mod upstream;

pub use api::AppState;
pub use client::{ClientError, DashboardClient};
pub use config::Config;
pub use error::AnalyticsError;
pub use resolver::{CacheState, Resolution, Resolver};
pub use tasks::spawn_sweep_task;
pub use throttle::CallThrottle;
pub use upstream::{
    AnalyticsOverview, AnalyticsSource, RecentActivity, TwitterSource, UpstreamError,
};
