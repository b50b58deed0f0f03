//! Response DTOs for the analytics API
//!
//! Shared by the server handlers and the dashboard client, so every body
//! both serializes and deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::resolver::{CacheState, Resolution};
use crate::upstream::{AnalyticsOverview, RecentActivity};

/// Headline account metrics shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewMetrics {
    pub total_followers: u64,
    pub following_count: u64,
    pub tweet_count: u64,
    pub listed_count: u64,
}

/// One recent post as shown in the dashboard activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub engagement: u64,
}

impl From<&RecentActivity> for ActivityItem {
    fn from(activity: &RecentActivity) -> Self {
        Self {
            id: activity.id.clone(),
            content: activity.content.clone(),
            timestamp: activity.created_at,
            engagement: activity.engagement,
        }
    }
}

/// Response body for GET /api/analytics/overview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub success: bool,
    pub username: String,
    pub name: String,
    pub metrics: OverviewMetrics,
    #[serde(default)]
    pub recent_activity: Vec<ActivityItem>,
    /// How the payload was served
    pub cache: CacheState,
    /// When the payload was fetched upstream
    pub fetched_at: DateTime<Utc>,
    /// True when served from an expired entry during a rate limit
    pub stale: bool,
}

impl From<&Resolution<AnalyticsOverview>> for OverviewResponse {
    fn from(resolution: &Resolution<AnalyticsOverview>) -> Self {
        let overview = resolution.value.as_ref();
        Self {
            success: true,
            username: overview.username.clone(),
            name: overview.name.clone(),
            metrics: OverviewMetrics {
                total_followers: overview.followers_count,
                following_count: overview.following_count,
                tweet_count: overview.tweet_count,
                listed_count: overview.listed_count,
            },
            recent_activity: overview.recent_activity.iter().map(ActivityItem::from).collect(),
            cache: resolution.state,
            fetched_at: resolution.fetched_at,
            stale: resolution.is_stale(),
        }
    }
}

/// Response body for GET /api/cache/stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Fresh hits over all lookups
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub service: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            service: "Analytics Cache API".to_string(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Seconds to wait before retrying, for rate-limit errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    /// Requested path, for unknown routes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            retry_after: None,
            path: None,
        }
    }

    pub fn with_retry_after(mut self, retry_after: Option<u64>) -> Self {
        self.retry_after = retry_after;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}
