//! Upstream failure classification.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use thiserror::Error;

/// Header carrying the Unix time (seconds) at which the rate-limit window resets.
pub const RATE_LIMIT_RESET: &str = "x-rate-limit-reset";

/// Retry-after reported when upstream gives no usable reset time.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

// == Upstream Error ==
/// One failed call to the upstream API, classified by status family.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Credential missing, invalid or lacking permission
    #[error("upstream rejected the credential")]
    Unauthorized,

    /// The requested resource does not exist upstream
    #[error("upstream resource not found")]
    NotFound,

    /// Upstream quota exhausted for the current window
    #[error("upstream rate limit reached, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Any other failure, including transport errors (no status)
    #[error("upstream request failed: {message}")]
    Other {
        status: Option<u16>,
        message: String,
    },
}

impl UpstreamError {
    /// HTTP-style status family of the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Unauthorized => 401,
            UpstreamError::NotFound => 404,
            UpstreamError::RateLimited { .. } => 429,
            UpstreamError::Other { status, .. } => status.unwrap_or(500),
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            UpstreamError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, UpstreamError::RateLimited { .. })
    }

    pub fn other(message: impl Into<String>) -> Self {
        UpstreamError::Other {
            status: None,
            message: message.into(),
        }
    }

    // == Classification ==
    /// Classifies a non-success response from its status and headers.
    ///
    /// `now` and `floor` feed the retry-after computation for 429s.
    pub fn from_response_parts(
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
        now: DateTime<Utc>,
        floor: u64,
    ) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamError::Unauthorized,
            StatusCode::NOT_FOUND => UpstreamError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited {
                retry_after: retry_after_secs(headers, now, floor),
            },
            other => UpstreamError::Other {
                status: Some(other.as_u16()),
                message: summarize_body(other, body),
            },
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Other {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

// == Retry-After ==
/// Seconds until the upstream rate-limit window resets.
///
/// Prefers `x-rate-limit-reset`, then a numeric `Retry-After`. Missing,
/// unparsable, out-of-range, or already-past values yield `floor`.
pub fn retry_after_secs(headers: &HeaderMap, now: DateTime<Utc>, floor: u64) -> u64 {
    if headers.contains_key(RATE_LIMIT_RESET) {
        return header_value::<i64>(headers, RATE_LIMIT_RESET)
            .and_then(|reset| reset.checked_sub(now.timestamp()))
            .and_then(|remaining| u64::try_from(remaining).ok())
            .filter(|remaining| *remaining > 0)
            .unwrap_or(floor);
    }

    match header_value::<u64>(headers, RETRY_AFTER.as_str()) {
        Some(secs) if secs > 0 => secs,
        _ => floor,
    }
}

fn header_value<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn summarize_body(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        let snippet: String = body.chars().take(200).collect();
        format!("status {}: {}", status.as_u16(), snippet)
    }
}
