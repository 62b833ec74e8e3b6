//! Bearer-token check for push requests.

use crate::gateway::GatewayError;
use axum::http::{header, HeaderMap};

/// Constant-time string comparison.
fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

/// Token from `Authorization: Bearer <token>`, if the header has that shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Require the request's bearer token to equal `expected` exactly.
pub fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), GatewayError> {
    let Some(given) = bearer_token(headers) else {
        log::warn!("push rejected: missing or malformed Authorization header");
        return Err(GatewayError::Unauthorized(
            "invalid Authorization header (expected Bearer token)".to_string(),
        ));
    };
    if expected.is_empty() || !safe_equal(given, expected) {
        log::warn!("push rejected: token mismatch");
        return Err(GatewayError::Unauthorized("invalid token".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn authorize_requires_exact_match() {
        assert!(authorize(&headers("Bearer abc"), "abc").is_ok());
        assert!(matches!(
            authorize(&headers("Bearer abcd"), "abc"),
            Err(GatewayError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize(&headers("Bearer ABC"), "abc"),
            Err(GatewayError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize(&HeaderMap::new(), "abc"),
            Err(GatewayError::Unauthorized(_))
        ));
    }

    #[test]
    fn empty_expected_token_never_authorizes() {
        assert!(authorize(&headers("Bearer x"), "").is_err());
    }
}
