//! JWT token validation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use shopauth_core::config::AuthConfig;

use super::claims::AccessClaims;
use crate::error::{AuthError, AuthResult};

/// Claims that must be present in every token.
const REQUIRED_CLAIMS: [&str; 4] = ["exp", "nbf", "iss", "sub"];

/// Validates HS256 tokens and maps failures onto the token error kinds.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Full validation: signature, issuer, `nbf` and `exp`.
    validation: Validation,
    /// Same as `validation` without the `exp` check.
    expired_validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.jwt_leeway_seconds;
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);

        let mut expired_validation = validation.clone();
        expired_validation.validate_exp = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            expired_validation,
        }
    }

    /// Decode and fully validate a token.
    pub fn decode(&self, token: &str) -> AuthResult<AccessClaims> {
        self.decode_with(token, &self.validation)
    }

    /// Decode a token whose only fault may be a past `exp`.
    ///
    /// Signature, issuer and `nbf` are still enforced.
    pub fn decode_allow_expired(&self, token: &str) -> AuthResult<AccessClaims> {
        self.decode_with(token, &self.expired_validation)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> AuthResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, validation)
            .map_err(|e| map_jwt_error(e.kind()))?;
        let claims = data.claims;

        if claims.user_id.is_empty() || claims.sub != claims.user_id {
            return Err(AuthError::ClaimsInvalid);
        }
        Ok(claims)
    }

    /// Read the `user_id` claim without verifying anything.
    ///
    /// For log correlation only. Returns an empty string for anything that
    /// does not look like a JWT.
    pub fn peek_user_id(token: &str) -> String {
        #[derive(Deserialize)]
        struct Peek {
            #[serde(default)]
            user_id: String,
        }

        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return String::new();
        };

        URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Peek>(&bytes).ok())
            .map(|peek| peek.user_id)
            .unwrap_or_default()
    }
}

fn map_jwt_error(kind: &JwtErrorKind) -> AuthError {
    match kind {
        JwtErrorKind::ExpiredSignature => AuthError::TokenExpired,
        JwtErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        JwtErrorKind::MissingRequiredClaim(_)
        | JwtErrorKind::InvalidIssuer
        | JwtErrorKind::InvalidSubject
        | JwtErrorKind::InvalidAudience => AuthError::ClaimsInvalid,
        _ => AuthError::TokenInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::Identity;
    use crate::jwt::encoder::JwtEncoder;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            ..AuthConfig::default()
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "42".into(),
            email: "a@x.com".into(),
            role: "customer".into(),
        }
    }

    fn sign_raw(payload: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_roundtrip() {
        let cfg = config();
        let issued = JwtEncoder::new(&cfg)
            .issue_at(&identity(), "sess-1", Utc::now())
            .unwrap();
        let claims = JwtDecoder::new(&cfg).decode(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.iss, "acme-users-service");
    }

    #[test]
    fn test_expired_vs_invalid() {
        let cfg = config();
        let decoder = JwtDecoder::new(&cfg);
        let old = JwtEncoder::new(&cfg)
            .issue_at(&identity(), "sess-1", Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(matches!(decoder.decode(&old.token), Err(AuthError::TokenExpired)));
        assert_eq!(decoder.decode_allow_expired(&old.token).unwrap().user_id, "42");

        let forged = JwtEncoder::new(&AuthConfig {
            jwt_secret: "other-secret".into(),
            ..AuthConfig::default()
        })
        .issue_at(&identity(), "sess-1", Utc::now())
        .unwrap();
        assert!(matches!(decoder.decode(&forged.token), Err(AuthError::TokenInvalid)));
        assert!(matches!(
            decoder.decode_allow_expired(&forged.token),
            Err(AuthError::TokenInvalid)
        ));

        assert!(matches!(decoder.decode("garbage"), Err(AuthError::TokenInvalid)));
        assert!(matches!(decoder.decode("a.b.c"), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_not_yet_valid() {
        let cfg = config();
        let future = JwtEncoder::new(&cfg)
            .issue_at(&identity(), "sess-1", Utc::now() + Duration::hours(1))
            .unwrap();
        assert!(matches!(
            JwtDecoder::new(&cfg).decode(&future.token),
            Err(AuthError::TokenNotYetValid)
        ));
    }

    #[test]
    fn test_leeway_tolerates_small_skew() {
        let cfg = AuthConfig {
            jwt_leeway_seconds: 120,
            ..config()
        };
        let skewed = JwtEncoder::new(&cfg)
            .issue_at(&identity(), "sess-1", Utc::now() + Duration::seconds(30))
            .unwrap();
        assert!(JwtDecoder::new(&cfg).decode(&skewed.token).is_ok());
    }

    #[test]
    fn test_claims_problems() {
        let cfg = config();
        let decoder = JwtDecoder::new(&cfg);
        let now = Utc::now().timestamp();

        let wrong_issuer = sign_raw(
            &serde_json::json!({
                "iss": "someone-else", "sub": "42", "user_id": "42",
                "iat": now, "nbf": now, "exp": now + 3600
            }),
            "unit-test-secret",
        );
        assert!(matches!(decoder.decode(&wrong_issuer), Err(AuthError::ClaimsInvalid)));

        let missing_user = sign_raw(
            &serde_json::json!({
                "iss": "acme-users-service", "sub": "42",
                "iat": now, "nbf": now, "exp": now + 3600
            }),
            "unit-test-secret",
        );
        assert!(matches!(decoder.decode(&missing_user), Err(AuthError::ClaimsInvalid)));

        let missing_nbf = sign_raw(
            &serde_json::json!({
                "iss": "acme-users-service", "sub": "42", "user_id": "42",
                "iat": now, "exp": now + 3600
            }),
            "unit-test-secret",
        );
        assert!(matches!(decoder.decode(&missing_nbf), Err(AuthError::ClaimsInvalid)));
    }

    #[test]
    fn test_peek_user_id() {
        let cfg = config();
        let issued = JwtEncoder::new(&cfg)
            .issue_at(&identity(), "sess-1", Utc::now() - Duration::hours(48))
            .unwrap();
        assert_eq!(JwtDecoder::peek_user_id(&issued.token), "42");

        let forged = JwtEncoder::new(&AuthConfig {
            jwt_secret: "other".into(),
            ..AuthConfig::default()
        })
        .issue_at(&identity(), "", Utc::now())
        .unwrap();
        assert_eq!(JwtDecoder::peek_user_id(&forged.token), "42");

        assert_eq!(JwtDecoder::peek_user_id(""), "");
        assert_eq!(JwtDecoder::peek_user_id("a.b"), "");
        assert_eq!(JwtDecoder::peek_user_id("a.!!!.c"), "");
    }
}
