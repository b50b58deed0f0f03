//! Dashboard Client
//!
//! HTTP client for the analytics API as used by the dashboard. Calls to
//! paced endpoints wait for their turn in a shared [`CallThrottle`], so any
//! number of concurrent widgets polling the overview stay at least the
//! configured interval apart.

use std::time::Duration;

use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, OVERVIEW_ENDPOINT};
use crate::models::{ErrorResponse, HealthResponse, OverviewResponse};
use crate::throttle::CallThrottle;

const HEALTH_ENDPOINT: &str = "/api/health";

/// Errors returned by [`DashboardClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// From the `Retry-After` header, when present
        retry_after: Option<u64>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ClientError::Api { retry_after, .. } => *retry_after,
            ClientError::Request(_) => None,
        }
    }
}

/// Client for the analytics API.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
    throttle: CallThrottle,
}

impl DashboardClient {
    /// Client pacing the overview endpoint at `overview_interval`.
    pub fn new(base_url: impl Into<String>, overview_interval: Duration) -> Self {
        Self::with_throttle(
            base_url,
            CallThrottle::with_intervals([(OVERVIEW_ENDPOINT, overview_interval)]),
        )
    }

    pub fn from_config(base_url: impl Into<String>, config: &Config) -> Self {
        Self::new(base_url, config.overview_min_interval())
    }

    /// Client sharing an existing throttle, e.g. with other clients.
    pub fn with_throttle(base_url: impl Into<String>, throttle: CallThrottle) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            throttle,
        }
    }

    pub fn throttle(&self) -> &CallThrottle {
        &self.throttle
    }

    /// Fetches the overview for `access_token`; no token sends no
    /// `Authorization` header.
    pub async fn analytics_overview(
        &self,
        access_token: Option<&str>,
    ) -> Result<OverviewResponse, ClientError> {
        self.throttle.wait_turn(OVERVIEW_ENDPOINT).await;

        let mut request = self.http.get(self.url(OVERVIEW_ENDPOINT));
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        decode(request.send().await?).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.throttle.wait_turn(HEALTH_ENDPOINT).await;
        decode(self.http.get(self.url(HEALTH_ENDPOINT)).send().await?).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| "API request failed".to_string());

    debug!("API returned {}: {}", status.as_u16(), message);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        retry_after,
    })
}
