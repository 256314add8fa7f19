//! Runtime feature toggles.
//!
//! Read once at startup and handed to the authentication core as plain
//! values. Nothing re-reads them per request.

use serde::{Deserialize, Serialize};

/// Feature flags consumed by the authentication core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Accept passwords stored under the deprecated MD5/SHA-1 digests.
    #[serde(default)]
    pub enable_legacy_auth: bool,
    /// Rehash legacy passwords under bcrypt after a successful login.
    #[serde(default = "default_true")]
    pub enable_password_migration: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_legacy_auth: false,
            enable_password_migration: true,
        }
    }
}

fn default_true() -> bool {
    true
}
