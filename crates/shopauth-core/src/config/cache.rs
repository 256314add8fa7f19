//! Cache and session-store backend configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level cache configuration.
///
/// The same provider holds session records and, when the credential cache
/// runs in `store` mode, cached credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider type: `"memory"` or `"redis"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory backend configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
    /// Credential read-through cache configuration.
    #[serde(default)]
    pub credentials: CredentialCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
            credentials: CredentialCacheConfig::default(),
        }
    }
}

/// Redis backend configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Prefix prepended to every key. Empty keeps the bare `session:<id>` layout.
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

impl fmt::Debug for RedisCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheConfig")
            .field("url", &super::mask_url(&self.url))
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// In-memory backend configuration.
///
/// The backend holds live sessions, so it is never size-bounded: entries
/// leave only by TTL or explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Number of entries to preallocate room for.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

/// Which implementation backs the credential cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialCacheMode {
    /// No caching; every lookup goes to the repository.
    #[default]
    None,
    /// Process-local moka cache.
    Memory,
    /// The configured cache provider (Redis in production).
    Store,
}

impl fmt::Display for CredentialCacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Memory => write!(f, "memory"),
            Self::Store => write!(f, "store"),
        }
    }
}

/// Credential cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialCacheConfig {
    /// Cache implementation.
    #[serde(default)]
    pub mode: CredentialCacheMode,
    /// TTL of a cached credential in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Capacity of the `memory` mode cache.
    #[serde(default = "default_credential_capacity")]
    pub max_capacity: u64,
}

impl Default for CredentialCacheConfig {
    fn default() -> Self {
        Self {
            mode: CredentialCacheMode::None,
            ttl_seconds: default_ttl(),
            max_capacity: default_credential_capacity(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_ttl() -> u64 {
    900
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_initial_capacity() -> usize {
    1024
}

fn default_credential_capacity() -> u64 {
    10_000
}
