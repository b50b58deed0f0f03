//! Error types for the analytics service
//!
//! Failures surfaced to callers, keeping the upstream classification intact.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::upstream::UpstreamError;

// == Analytics Error Enum ==
/// Irrecoverable outcome of resolving analytics for an identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Missing or invalid credential; never cached, never retried
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource absent upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream quota exhausted and no cached fallback available
    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Anything else
    #[error("Upstream failure: {0}")]
    Unknown(String),
}

impl AnalyticsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyticsError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AnalyticsError::NotFound(_) => StatusCode::NOT_FOUND,
            AnalyticsError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalyticsError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            AnalyticsError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<UpstreamError> for AnalyticsError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Unauthorized => {
                AnalyticsError::Unauthenticated("credential rejected by upstream".to_string())
            }
            UpstreamError::NotFound => {
                AnalyticsError::NotFound("analytics resource not found upstream".to_string())
            }
            UpstreamError::RateLimited { retry_after } => AnalyticsError::RateLimited { retry_after },
            other @ UpstreamError::Other { .. } => AnalyticsError::Unknown(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = self.retry_after();
        let body = Json(ErrorResponse::new(self.to_string()).with_retry_after(retry_after));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_preserved() {
        assert!(matches!(
            AnalyticsError::from(UpstreamError::Unauthorized),
            AnalyticsError::Unauthenticated(_)
        ));
        assert!(matches!(
            AnalyticsError::from(UpstreamError::NotFound),
            AnalyticsError::NotFound(_)
        ));
        assert_eq!(
            AnalyticsError::from(UpstreamError::RateLimited { retry_after: 45 }),
            AnalyticsError::RateLimited { retry_after: 45 }
        );
        assert!(matches!(
            AnalyticsError::from(UpstreamError::other("boom")),
            AnalyticsError::Unknown(msg) if msg.contains("boom")
        ));
    }

    #[test]
    fn test_rate_limited_response_sets_retry_after() {
        let response = AnalyticsError::RateLimited { retry_after: 60 }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    }

    #[test]
    fn test_other_responses_have_no_retry_after() {
        let response = AnalyticsError::Unauthenticated("missing".into()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
