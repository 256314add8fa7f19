//! In-memory key/value store using moka and dashmap.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use tracing::debug;

use shopauth_core::config::cache::MemoryCacheConfig;
use shopauth_core::result::AppResult;
use shopauth_core::traits::cache::CacheProvider;

use super::expiry::{Expiring, PerEntryExpiry};

/// In-memory provider for single-node deployments and tests.
///
/// String entries expire individually after the TTL they were written with
/// and are never evicted for space, so a live session stays readable until
/// its expiry. Sets live in a separate map and never expire, matching Redis
/// `SADD` keys without an `EXPIRE`.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// TTL-bound string entries.
    cache: Cache<String, Expiring<String>>,
    /// Set-valued keys.
    sets: Arc<DashMap<String, HashSet<String>>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .initial_capacity(config.initial_capacity)
            .expire_after(PerEntryExpiry)
            .build();

        Self {
            cache,
            sets: Arc::new(DashMap::new()),
        }
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new(&MemoryCacheConfig::default())
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), Expiring::new(value.to_string(), ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.sets.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()> {
        if let Some(mut set) = self.sets.get_mut(key) {
            set.remove(member);
        }
        // Redis drops a set once its last member is gone.
        let removed = self.sets.remove_if(key, |_, set| set.is_empty());
        if removed.is_some() {
            debug!(key, "Removed empty set");
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
