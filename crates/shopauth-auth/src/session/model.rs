//! Session record as stored in the key/value backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-side record of an authenticated browsing period.
///
/// The record is authoritative over any token that references it: a token
/// whose session is gone or inactive is not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Globally unique session ID.
    pub id: String,
    /// Owning user ID.
    pub user_id: String,
    /// Email at login time.
    pub email: String,
    /// Role at login time.
    pub role: String,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
    /// Client address at login.
    pub ip_address: String,
    /// Client user agent at login.
    pub user_agent: String,
    /// Cleared on revocation.
    pub active: bool,
}

impl Session {
    /// Whether `now` is past `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now).to_std().unwrap_or_default()
    }
}
