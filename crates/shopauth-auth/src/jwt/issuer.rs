//! Token issuance, validation, and refresh behind one facade.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use shopauth_core::config::AuthConfig;
use shopauth_core::events::AuthEvent;
use shopauth_core::traits::EventSink;

use super::claims::{AccessClaims, Identity};
use super::decoder::JwtDecoder;
use super::encoder::{IssuedToken, JwtEncoder};
use crate::error::{AuthError, AuthResult};

/// Mints, checks, and renews signed access tokens.
///
/// A token is never edited: refresh always signs a new value with a new
/// validity window.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    events: Arc<dyn EventSink>,
}

impl TokenIssuer {
    /// Creates an issuer from auth configuration.
    pub fn new(config: &AuthConfig, events: Arc<dyn EventSink>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            events,
        }
    }

    /// Issue a token for `identity` bound to `session_id`, valid from now.
    pub fn issue(&self, identity: &Identity, session_id: &str) -> AuthResult<IssuedToken> {
        self.issue_at(identity, session_id, Utc::now())
    }

    /// Issue a token whose validity window starts at `now`.
    pub fn issue_at(
        &self,
        identity: &Identity,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let issued = self.encoder.issue_at(identity, session_id, now)?;
        self.events.emit(AuthEvent::TokenIssued {
            user_id: identity.user_id.clone(),
            session_id: session_id.to_string(),
        });
        Ok(issued)
    }

    /// Verify signature, issuer and validity window.
    pub fn validate(&self, token: &str) -> AuthResult<AccessClaims> {
        self.decoder.decode(token).inspect_err(|e| self.rejected(e))
    }

    /// Like [`validate`](Self::validate), but a token whose only fault is
    /// a past `exp` is accepted. Every other failure is still rejected.
    pub fn validate_allowing_expiry(&self, token: &str) -> AuthResult<AccessClaims> {
        match self.decoder.decode(token) {
            Err(AuthError::TokenExpired) => self
                .decoder
                .decode_allow_expired(token)
                .inspect_err(|e| self.rejected(e)),
            other => other.inspect_err(|e| self.rejected(e)),
        }
    }

    /// Exchange a valid or merely expired token for a fresh one carrying the
    /// same identity and session.
    pub fn refresh(&self, token: &str) -> AuthResult<IssuedToken> {
        let claims = self.validate_allowing_expiry(token)?;
        self.reissue(&claims)
    }

    /// Sign fresh claims for an already validated token.
    pub fn reissue(&self, claims: &AccessClaims) -> AuthResult<IssuedToken> {
        let issued = self.encoder.reissue_at(claims, Utc::now())?;
        self.events.emit(AuthEvent::TokenRefreshed {
            user_id: claims.user_id.clone(),
            session_id: claims.session_id.clone(),
        });
        Ok(issued)
    }

    /// Unverified `user_id` of a token, or `""`. Diagnostics only.
    pub fn peek_identity(&self, token: &str) -> String {
        JwtDecoder::peek_user_id(token)
    }

    /// Time until the token expires. Fails exactly as `validate` does.
    pub fn remaining_ttl(&self, token: &str) -> AuthResult<Duration> {
        let claims = self.validate(token)?;
        Ok(claims.remaining_at(Utc::now()))
    }

    fn rejected(&self, err: &AuthError) {
        self.events.emit(AuthEvent::TokenRejected {
            reason: err.to_string(),
        });
    }
}
