//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty file plus the
//! `SHOPAUTH__AUTH__JWT_SECRET` variable is a runnable configuration.

pub mod app;
pub mod auth;
pub mod cache;
pub mod features;
pub mod logging;
pub mod session;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::cache::{CacheConfig, CredentialCacheConfig, CredentialCacheMode};
pub use self::features::FeatureFlags;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Highest bcrypt input length that is not silently truncated.
const BCRYPT_MAX_INPUT: usize = 72;

/// Upper bound for token and session lifetimes, in hours (one year).
const MAX_LIFETIME_HOURS: u64 = 24 * 365;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session store and cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token and password settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifetime settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Runtime feature toggles.
    #[serde(default)]
    pub features: FeatureFlags,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Empty selects the in-memory repository.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &mask_url(&self.url))
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("idle_timeout_seconds", &self.idle_timeout_seconds)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `SHOPAUTH__`, then rejects
    /// settings the server cannot run with.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SHOPAUTH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.jwt_secret must be set (SHOPAUTH__AUTH__JWT_SECRET)",
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(AppError::configuration(format!(
                "auth.bcrypt_cost must be within 4..=31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.auth.password_max_length > BCRYPT_MAX_INPUT {
            return Err(AppError::configuration(format!(
                "auth.password_max_length cannot exceed {BCRYPT_MAX_INPUT}"
            )));
        }
        if self.auth.password_min_length == 0
            || self.auth.password_min_length > self.auth.password_max_length
        {
            return Err(AppError::configuration(
                "auth.password_min_length must be between 1 and password_max_length",
            ));
        }
        if self.auth.password_min_strength > 4 {
            return Err(AppError::configuration(
                "auth.password_min_strength is a zxcvbn score between 0 and 4",
            ));
        }
        for (name, hours) in [
            ("auth.jwt_ttl_hours", self.auth.jwt_ttl_hours),
            ("session.lifetime_hours", self.session.lifetime_hours),
        ] {
            if !(1..=MAX_LIFETIME_HOURS).contains(&hours) {
                return Err(AppError::configuration(format!(
                    "{name} must be within 1..={MAX_LIFETIME_HOURS}, got {hours}"
                )));
            }
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(AppError::configuration(
                "server.request_timeout_seconds must be positive",
            ));
        }
        if !matches!(self.cache.provider.as_str(), "memory" | "redis") {
            return Err(AppError::configuration(format!(
                "Unknown cache provider: '{}'. Supported: memory, redis",
                self.cache.provider
            )));
        }
        Ok(())
    }
}

/// Mask the password portion of a connection URL for safe logging.
pub fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos >= scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
