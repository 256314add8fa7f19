//! Authentication configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token signing and password hashing configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256). Must be set.
    #[serde(default)]
    pub jwt_secret: String,
    /// `iss` claim written into and required from every token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Access token TTL in hours.
    #[serde(default = "default_ttl_hours")]
    pub jwt_ttl_hours: u64,
    /// Clock-skew tolerance applied to `exp` and `nbf`, in seconds.
    #[serde(default)]
    pub jwt_leeway_seconds: u64,
    /// bcrypt work factor for newly computed hashes.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Minimum password length in bytes.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length in bytes. bcrypt ignores input past 72 bytes.
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Minimum zxcvbn score (0-4) for new passwords. `0` disables the check.
    #[serde(default)]
    pub password_min_strength: u8,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            jwt_ttl_hours: default_ttl_hours(),
            jwt_leeway_seconds: 0,
            bcrypt_cost: default_bcrypt_cost(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            password_min_strength: 0,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_ttl_hours", &self.jwt_ttl_hours)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("password_min_length", &self.password_min_length)
            .field("password_max_length", &self.password_max_length)
            .field("password_min_strength", &self.password_min_strength)
            .finish()
    }
}

fn default_issuer() -> String {
    "acme-users-service".to_string()
}

fn default_ttl_hours() -> u64 {
    24
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_password_min() -> usize {
    8
}

fn default_password_max() -> usize {
    72
}
