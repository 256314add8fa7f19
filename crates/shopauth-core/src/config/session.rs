//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Server-side session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a session record in hours. Refresh extends it by this much.
    #[serde(default = "default_lifetime")]
    pub lifetime_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_hours: default_lifetime(),
        }
    }
}

fn default_lifetime() -> u64 {
    24
}
