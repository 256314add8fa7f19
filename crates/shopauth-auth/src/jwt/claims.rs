//! JWT claims structure embedded in every access token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a token speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque user identifier.
    pub user_id: String,
    /// Login email.
    pub email: String,
    /// Role at the time of issuance.
    pub role: String,
}

/// JWT claims payload.
///
/// Custom claims default to empty when absent so that a well-signed token
/// with missing fields is reported as a claims problem rather than a
/// decoding problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer.
    #[serde(default)]
    pub iss: String,
    /// Subject: the user ID.
    #[serde(default)]
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    #[serde(default)]
    pub exp: i64,
    /// Not-before timestamp (seconds since epoch).
    #[serde(default)]
    pub nbf: i64,
    /// Unique token ID; makes every issuance a distinct value.
    #[serde(default)]
    pub jti: String,
    /// User ID.
    #[serde(default)]
    pub user_id: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Role.
    #[serde(default)]
    pub role: String,
    /// Session this token is bound to; empty for session-less tokens.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,
}

impl AccessClaims {
    /// Build claims valid from `now` until `now + ttl`.
    pub fn new(
        identity: &Identity,
        session_id: &str,
        issuer: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: identity.user_id.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            session_id: session_id.to_string(),
        }
    }

    /// The identity the claims assert.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }

    /// The bound session, if any.
    pub fn session_id(&self) -> Option<&str> {
        if self.session_id.is_empty() {
            None
        } else {
            Some(&self.session_id)
        }
    }

    /// Returns the issuance time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Time left until expiry, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at() - now).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "42".into(),
            email: "a@x.com".into(),
            role: "customer".into(),
        }
    }

    #[test]
    fn test_new_sets_window() {
        let now = Utc::now();
        let claims = AccessClaims::new(&identity(), "sess-1", "iss", now, Duration::hours(24));
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.nbf, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.session_id(), Some("sess-1"));
        assert_eq!(claims.identity(), identity());
    }

    #[test]
    fn test_session_id_omitted_when_empty() {
        let claims = AccessClaims::new(&identity(), "", "iss", Utc::now(), Duration::hours(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("session_id").is_none());
        assert_eq!(claims.session_id(), None);
    }

    #[test]
    fn test_remaining_at() {
        let now = Utc::now();
        let claims = AccessClaims::new(&identity(), "s", "iss", now, Duration::hours(1));
        let remaining = claims.remaining_at(now);
        assert!(remaining <= std::time::Duration::from_secs(3600));
        assert!(remaining > std::time::Duration::from_secs(3590));
        assert_eq!(
            claims.remaining_at(now + Duration::hours(2)),
            std::time::Duration::ZERO
        );
    }

    #[test]
    fn test_each_issuance_is_distinct() {
        let now = Utc::now();
        let a = AccessClaims::new(&identity(), "s", "iss", now, Duration::hours(1));
        let b = AccessClaims::new(&identity(), "s", "iss", now, Duration::hours(1));
        assert_ne!(a.jti, b.jti);
    }
}
