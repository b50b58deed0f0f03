//! Request and Response models for the analytics API
//!
//! DTOs used for serializing/deserializing HTTP bodies and reading request
//! headers.

pub mod requests;
pub mod responses;

pub use requests::bearer_token;
pub use responses::{
    ActivityItem, ErrorResponse, HealthResponse, OverviewMetrics, OverviewResponse, StatsResponse,
};
