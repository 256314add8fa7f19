//! Credential storage traits.
//!
//! The authentication core reads and replaces password hashes through
//! [`CredentialRepository`]; it never owns the user record itself.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// The slice of a user account the authentication core needs.
///
/// The hash scheme is not stored: it is always re-derived from
/// `password_hash` alone.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque user identifier.
    pub user_id: String,
    /// Login email.
    pub email: String,
    /// Role carried into token claims.
    pub role: String,
    /// Stored password hash in any supported scheme.
    pub password_hash: String,
    /// Whether the account may log in.
    pub active: bool,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_hash", &"<redacted>")
            .field("active", &self.active)
            .finish()
    }
}

/// Persistence operations on user credentials.
#[async_trait]
pub trait CredentialRepository: Send + Sync + fmt::Debug + 'static {
    /// Look up a credential by login email. `None` when no account matches.
    async fn get_credential_by_email(&self, email: &str) -> AppResult<Option<Credential>>;

    /// Fetch the stored hash for a user. `None` when the user does not exist.
    async fn get_password_hash(&self, user_id: &str) -> AppResult<Option<String>>;

    /// Replace the stored hash. Last writer wins.
    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()>;

    /// Record a successful login at the current time.
    async fn update_last_login(&self, user_id: &str) -> AppResult<()>;
}

/// Read-through cache in front of a [`CredentialRepository`], keyed by user ID.
///
/// Purely a latency optimisation: a miss or a failure falls back to the
/// repository.
#[async_trait]
pub trait CredentialCache: Send + Sync + fmt::Debug + 'static {
    /// Return the cached credential, if any.
    async fn get(&self, user_id: &str) -> AppResult<Option<Credential>>;

    /// Cache a credential for `ttl`.
    async fn set(&self, credential: &Credential, ttl: Duration) -> AppResult<()>;

    /// Drop any cached entry for the user.
    async fn invalidate(&self, user_id: &str) -> AppResult<()>;
}
