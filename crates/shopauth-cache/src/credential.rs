//! Credential cache implementations.
//!
//! Three interchangeable [`CredentialCache`]s selected by
//! `cache.credentials.mode`: nothing, a process-local moka cache, or the
//! shared key/value store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use shopauth_core::config::cache::{CredentialCacheConfig, CredentialCacheMode};
use shopauth_core::result::AppResult;
use shopauth_core::traits::cache::CacheProvider;
use shopauth_core::traits::credential::{Credential, CredentialCache};

use crate::keys;

/// Build the credential cache the configuration asks for.
///
/// `store` is the provider used in `store` mode; it is ignored otherwise.
pub fn build_credential_cache(
    config: &CredentialCacheConfig,
    store: Arc<dyn CacheProvider>,
) -> Arc<dyn CredentialCache> {
    info!(mode = %config.mode, ttl_seconds = config.ttl_seconds, "Initializing credential cache");
    match config.mode {
        CredentialCacheMode::None => Arc::new(NoopCredentialCache),
        #[cfg(feature = "memory")]
        CredentialCacheMode::Memory => Arc::new(MemoryCredentialCache::new(config.max_capacity)),
        #[cfg(not(feature = "memory"))]
        CredentialCacheMode::Memory => {
            tracing::warn!("Memory credential cache not compiled in, caching disabled");
            Arc::new(NoopCredentialCache)
        }
        CredentialCacheMode::Store => Arc::new(StoreCredentialCache::new(store)),
    }
}

/// Caches nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCredentialCache;

#[async_trait]
impl CredentialCache for NoopCredentialCache {
    async fn get(&self, _user_id: &str) -> AppResult<Option<Credential>> {
        Ok(None)
    }

    async fn set(&self, _credential: &Credential, _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _user_id: &str) -> AppResult<()> {
        Ok(())
    }
}

/// Process-local credential cache.
#[cfg(feature = "memory")]
#[derive(Debug, Clone)]
pub struct MemoryCredentialCache {
    cache: moka::future::Cache<String, crate::memory::Expiring<Credential>>,
}

#[cfg(feature = "memory")]
impl MemoryCredentialCache {
    /// Create a cache holding at most `max_capacity` credentials.
    pub fn new(max_capacity: u64) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(crate::memory::PerEntryExpiry)
            .build();
        Self { cache }
    }
}

#[cfg(feature = "memory")]
#[async_trait]
impl CredentialCache for MemoryCredentialCache {
    async fn get(&self, user_id: &str) -> AppResult<Option<Credential>> {
        Ok(self.cache.get(user_id).await.map(|entry| entry.value))
    }

    async fn set(&self, credential: &Credential, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                credential.user_id.clone(),
                crate::memory::Expiring::new(credential.clone(), ttl),
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, user_id: &str) -> AppResult<()> {
        self.cache.invalidate(user_id).await;
        Ok(())
    }
}

/// Credential cache stored as JSON in the shared key/value store.
#[derive(Debug, Clone)]
pub struct StoreCredentialCache {
    store: Arc<dyn CacheProvider>,
}

impl StoreCredentialCache {
    /// Wrap a key/value provider.
    pub fn new(store: Arc<dyn CacheProvider>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialCache for StoreCredentialCache {
    async fn get(&self, user_id: &str) -> AppResult<Option<Credential>> {
        match self.store.get(&keys::credential(user_id)).await? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, credential: &Credential, ttl: Duration) -> AppResult<()> {
        let payload = serde_json::to_string(credential)?;
        self.store
            .set(&keys::credential(&credential.user_id), &payload, ttl)
            .await
    }

    async fn invalidate(&self, user_id: &str) -> AppResult<()> {
        self.store.delete(&keys::credential(user_id)).await
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::memory::MemoryCacheProvider;

    fn credential() -> Credential {
        Credential {
            user_id: "u1".into(),
            email: "a@x.com".into(),
            role: "customer".into(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuuVWb3zOr1Kc7H8zxyV8bx0yQ7Q4gX8pK".into(),
            active: true,
        }
    }

    async fn exercise(cache: &dyn CredentialCache) {
        let cred = credential();
        assert_eq!(cache.get("u1").await.unwrap(), None);

        cache.set(&cred, Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("u1").await.unwrap(), Some(cred));

        cache.invalidate("u1").await.unwrap();
        assert_eq!(cache.get("u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache_roundtrip() {
        exercise(&MemoryCredentialCache::new(100)).await;
    }

    #[tokio::test]
    async fn test_store_cache_roundtrip() {
        let store: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::default());
        exercise(&StoreCredentialCache::new(store.clone())).await;
    }

    #[tokio::test]
    async fn test_store_cache_uses_credential_key() {
        let store: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::default());
        let cache = StoreCredentialCache::new(store.clone());
        cache.set(&credential(), Duration::from_secs(60)).await.unwrap();
        assert!(store.get("credential:u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCredentialCache;
        cache.set(&credential(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_builder_selects_by_mode() {
        let store: Arc<dyn CacheProvider> = Arc::new(MemoryCacheProvider::default());
        for mode in [
            CredentialCacheMode::None,
            CredentialCacheMode::Memory,
            CredentialCacheMode::Store,
        ] {
            let config = CredentialCacheConfig {
                mode,
                ..CredentialCacheConfig::default()
            };
            let cache = build_credential_cache(&config, store.clone());
            cache.set(&credential(), Duration::from_secs(60)).await.unwrap();
            let hit = cache.get("u1").await.unwrap().is_some();
            assert_eq!(hit, mode != CredentialCacheMode::None, "mode {mode}");
        }
    }
}
