//! JWT token creation with HS256 signing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use shopauth_core::config::AuthConfig;
use shopauth_core::error::AppError;

use super::claims::{AccessClaims, Identity};
use crate::error::AuthResult;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The compact JWT.
    pub token: String,
    /// The signed claims.
    pub claims: AccessClaims,
}

impl IssuedToken {
    /// Expiration timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// Creates signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// `iss` claim.
    issuer: String,
    /// Token lifetime.
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            ttl: Duration::hours(config.jwt_ttl_hours as i64),
        }
    }

    /// Sign a token for `identity` bound to `session_id`, valid from `now`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let claims = AccessClaims::new(identity, session_id, &self.issuer, now, self.ttl);
        self.sign(claims)
    }

    /// Sign a new token carrying the identity and session of `claims`,
    /// with a fresh validity window starting at `now`.
    pub fn reissue_at(&self, claims: &AccessClaims, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        self.issue_at(&claims.identity(), &claims.session_id, now)
    }

    fn sign(&self, claims: AccessClaims) -> AuthResult<IssuedToken> {
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;
        Ok(IssuedToken { token, claims })
    }
}
