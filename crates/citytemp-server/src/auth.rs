//! Credential shape check for the lookup endpoint.
//!
//! Tokens are opaque: only their length is checked. There is no identity,
//! signature or expiry behind them.

use axum::http::{header, HeaderMap};
use thiserror::Error;

/// Shortest accepted token, in characters.
pub const MIN_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("auth_token is required")]
    Missing,

    #[error("auth_token must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// A token that passed the shape check.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let actual = raw.chars().count();
        if actual < MIN_TOKEN_LEN {
            return Err(AuthError::TooShort {
                min: MIN_TOKEN_LEN,
                actual,
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Pick the credential from the `auth_token` query value, falling back to
    /// an `Authorization: Bearer` header.
    pub fn from_request(query_token: Option<&str>, headers: &HeaderMap) -> Result<Self, AuthError> {
        let raw = query_token
            .or_else(|| bearer_token(headers))
            .ok_or(AuthError::Missing)?;
        Self::parse(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"<redacted>").finish()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_short_token_rejected() {
        let err = AuthToken::parse(&"a".repeat(31)).unwrap_err();
        assert_eq!(err, AuthError::TooShort { min: 32, actual: 31 });
        assert!(AuthToken::parse("").is_err());
    }

    #[test]
    fn test_any_token_of_min_length_accepted() {
        assert!(AuthToken::parse(&"a".repeat(32)).is_ok());
        assert!(AuthToken::parse(&"!".repeat(40)).is_ok());
        assert!(AuthToken::parse(&" ".repeat(32)).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 16 two-byte characters: 32 bytes but only 16 characters.
        assert!(AuthToken::parse(&"é".repeat(16)).is_err());
        assert!(AuthToken::parse(&"é".repeat(32)).is_ok());
    }

    #[test]
    fn test_query_token_preferred_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer short"),
        );
        let query = "q".repeat(32);
        let token = AuthToken::from_request(Some(&query), &headers).unwrap();
        assert_eq!(token.as_str(), query);
    }

    #[test]
    fn test_bearer_header_fallback() {
        let raw = "h".repeat(40);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", raw)).unwrap(),
        );
        let token = AuthToken::from_request(None, &headers).unwrap();
        assert_eq!(token.as_str(), raw);
    }

    #[test]
    fn test_missing_credential() {
        let err = AuthToken::from_request(None, &HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::Missing);
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AuthToken::parse(&"s".repeat(32)).unwrap();
        assert!(!format!("{:?}", token).contains("sss"));
    }
}
