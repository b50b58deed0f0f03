//! Request-side helpers for the analytics API
//!
//! The overview endpoint takes no body; the caller's identity arrives as a
//! bearer credential.

use axum::http::{header, HeaderMap};

/// Extracts the bearer credential from an `Authorization` header.
///
/// Returns None when the header is absent, not a bearer scheme, or blank.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&with_auth("Bearer tok1")).as_deref(), Some("tok1"));
        assert_eq!(bearer_token(&with_auth("bearer  tok1 ")).as_deref(), Some("tok1"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert!(bearer_token(&with_auth("Basic dXNlcjpwYXNz")).is_none());
        assert!(bearer_token(&with_auth("Bearer   ")).is_none());
        assert!(bearer_token(&with_auth("tok1")).is_none());
        assert!(bearer_token(&HeaderMap::new()).is_none());
    }
}
