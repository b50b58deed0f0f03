//! Upstream Module
//!
//! The boundary to the external analytics API: one call per `fetch`, with
//! failures classified into [`UpstreamError`]. Retry and fallback policy
//! live in the resolver, not here.

mod error;
mod twitter;

pub use error::{retry_after_secs, UpstreamError, DEFAULT_RETRY_AFTER_SECS, RATE_LIMIT_RESET};
pub use twitter::TwitterSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Analytics Source ==
/// Performs exactly one upstream call for an identity.
#[async_trait]
pub trait AnalyticsSource<V>: Send + Sync {
    /// Fetches the resource scoped to `identity`. Must not retry.
    async fn fetch(&self, identity: &str) -> Result<V, UpstreamError>;
}

// == Analytics Overview ==
/// Account metrics for the authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub username: String,
    pub name: String,
    pub followers_count: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    pub listed_count: u64,
    /// Latest posts, newest first. Empty when the account has not posted.
    #[serde(default)]
    pub recent_activity: Vec<RecentActivity>,
}

/// One recent post and the engagement it drew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Likes, reposts, replies and quotes combined
    pub engagement: u64,
}
