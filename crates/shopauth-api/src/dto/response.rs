//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopauth_auth::{AccessClaims, Identity, Session};

/// User summary returned at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Role.
    pub role: String,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.user_id,
            email: identity.email,
            role: identity.role,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Always `true`.
    pub success: bool,
    /// Access token.
    pub token: String,
    /// The authenticated user.
    pub user: UserResponse,
    /// The new session ID.
    pub session_id: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    /// Always `true`.
    pub success: bool,
    /// Replacement access token.
    pub token: String,
    /// Replacement token expiry.
    pub expires_at: DateTime<Utc>,
}

/// Token validation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    /// Always `true`.
    pub success: bool,
    /// Always `true`; invalid tokens get an error response.
    pub valid: bool,
    /// The validated claims.
    pub claims: AccessClaims,
}

/// Session listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    /// Always `true`.
    pub success: bool,
    /// Live sessions, newest first.
    pub sessions: Vec<Session>,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Always `true`.
    pub success: bool,
    /// What happened.
    pub message: String,
}

impl MessageResponse {
    /// A successful acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
