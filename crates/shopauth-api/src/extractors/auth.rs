//! Bearer token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use shopauth_auth::{AccessClaims, with_deadline};

use crate::error::ApiError;
use crate::state::AppState;

/// The raw token from `Authorization: Bearer <token>`, unvalidated.
///
/// The scheme name is matched case-insensitively.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Parse an `Authorization` header value.
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, token) = header.split_once(' ')?;
        let token = token.trim();
        if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .ok_or(ApiError::MissingToken)
    }
}

/// An authenticated caller: a valid token whose session is still live.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The validated claims.
    pub claims: AccessClaims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let claims = with_deadline(
            state.request_timeout,
            state.orchestrator.validate_access(&token),
        )
        .await?;

        Ok(Self { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(BearerToken::parse("Bearer abc").unwrap().0, "abc");
        assert_eq!(BearerToken::parse("bearer abc").unwrap().0, "abc");
        assert_eq!(BearerToken::parse("BEARER  abc ").unwrap().0, "abc");
        assert!(BearerToken::parse("Basic abc").is_none());
        assert!(BearerToken::parse("Bearer").is_none());
        assert!(BearerToken::parse("Bearer ").is_none());
        assert!(BearerToken::parse("").is_none());
    }
}
