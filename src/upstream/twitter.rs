//! Twitter API v2 adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    AnalyticsOverview, AnalyticsSource, RecentActivity, UpstreamError, DEFAULT_RETRY_AFTER_SECS,
};

/// The authenticated user with metrics, plus their latest post in `includes`.
const ME_PATH: &str = "/2/users/me?user.fields=public_metrics,most_recent_tweet_id\
    &expansions=most_recent_tweet_id&tweet.fields=created_at,public_metrics";

/// Fetches the authenticated user's public metrics with a bearer token.
#[derive(Debug, Clone)]
pub struct TwitterSource {
    client: Client,
    base_url: String,
    retry_after_floor: u64,
}

impl TwitterSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Uses a caller-supplied HTTP client (timeouts, proxies, ...).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_after_floor: DEFAULT_RETRY_AFTER_SECS,
        }
    }

    pub fn with_retry_after_floor(mut self, secs: u64) -> Self {
        self.retry_after_floor = secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    data: UserData,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    tweets: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    #[serde(default)]
    text: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    public_metrics: TweetMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct TweetMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    quote_count: u64,
}

impl From<Tweet> for RecentActivity {
    fn from(tweet: Tweet) -> Self {
        let m = tweet.public_metrics;
        Self {
            id: tweet.id,
            content: tweet.text,
            created_at: tweet.created_at,
            engagement: m
                .like_count
                .saturating_add(m.retweet_count)
                .saturating_add(m.reply_count)
                .saturating_add(m.quote_count),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserData {
    username: String,
    #[serde(default)]
    name: String,
    public_metrics: PublicMetrics,
}

#[derive(Debug, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    following_count: u64,
    #[serde(default)]
    tweet_count: u64,
    #[serde(default)]
    listed_count: u64,
}

impl From<MeResponse> for AnalyticsOverview {
    fn from(resp: MeResponse) -> Self {
        let user = resp.data;
        let mut recent_activity: Vec<RecentActivity> =
            resp.includes.tweets.into_iter().map(RecentActivity::from).collect();
        recent_activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            username: user.username,
            name: user.name,
            followers_count: user.public_metrics.followers_count,
            following_count: user.public_metrics.following_count,
            tweet_count: user.public_metrics.tweet_count,
            listed_count: user.public_metrics.listed_count,
            recent_activity,
        }
    }
}

#[async_trait]
impl AnalyticsSource<AnalyticsOverview> for TwitterSource {
    async fn fetch(&self, identity: &str) -> Result<AnalyticsOverview, UpstreamError> {
        let url = format!("{}{}", self.base_url, ME_PATH);

        let response = self.client.get(&url).bearer_auth(identity).send().await?;
        let status = response.status();
        debug!("Upstream responded {} for {}", status.as_u16(), ME_PATH);

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_response_parts(
                status,
                &headers,
                &body,
                Utc::now(),
                self.retry_after_floor,
            ));
        }

        let body = response.text().await?;
        let parsed: MeResponse = serde_json::from_str(&body).map_err(|e| UpstreamError::Other {
            status: None,
            message: format!("unexpected response body: {}", e),
        })?;

        Ok(parsed.into())
    }
}
