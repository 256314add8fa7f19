//! Cache provider trait for pluggable key/value backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for TTL-capable key/value backends (Redis or in-memory).
///
/// All values are strings (JSON). Session records and the per-user session
/// index live here, so implementations must honour per-entry TTLs exactly.
/// The provider is responsible for key prefixing.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Add a member to the set stored at `key`. Sets carry no TTL.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<()>;

    /// Return every member of the set stored at `key` (empty if absent).
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Remove a member from the set stored at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
