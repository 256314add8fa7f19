//! Caching decorator around a credential repository.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use shopauth_core::result::AppResult;
use shopauth_core::traits::{Credential, CredentialCache, CredentialRepository};

/// Serves password hashes from a [`CredentialCache`] when it can.
///
/// Email lookups always reach the repository (the account's active flag and
/// role must be current at login) and refresh the cache on the way back.
/// Writes invalidate. A failing cache is logged and bypassed; it never fails
/// a repository call.
///
/// A lookup that raced with a write may have read the old hash. Every
/// invalidation bumps `epoch` after the repository write, and a lookup that
/// sees the epoch move while it was filling the cache drops its own entry.
#[derive(Debug, Clone)]
pub struct CachedCredentialRepository {
    inner: Arc<dyn CredentialRepository>,
    cache: Arc<dyn CredentialCache>,
    ttl: Duration,
    epoch: Arc<AtomicU64>,
}

impl CachedCredentialRepository {
    /// Wrap `inner`, caching entries for `ttl`.
    pub fn new(
        inner: Arc<dyn CredentialRepository>,
        cache: Arc<dyn CredentialCache>,
        ttl: Duration,
    ) -> Self {
        Self {
            inner,
            cache,
            ttl,
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    async fn invalidate(&self, user_id: &str) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.drop_entry(user_id).await;
    }

    async fn drop_entry(&self, user_id: &str) {
        if let Err(e) = self.cache.invalidate(user_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to invalidate cached credential");
        }
    }
}

#[async_trait]
impl CredentialRepository for CachedCredentialRepository {
    async fn get_credential_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        let seen = self.epoch.load(Ordering::SeqCst);
        let credential = self.inner.get_credential_by_email(email).await?;
        if let Some(credential) = &credential {
            if let Err(e) = self.cache.set(credential, self.ttl).await {
                warn!(user_id = %credential.user_id, error = %e, "Failed to cache credential");
            } else if self.epoch.load(Ordering::SeqCst) != seen {
                debug!(user_id = %credential.user_id, "Credential changed during lookup, not caching");
                self.drop_entry(&credential.user_id).await;
            }
        }
        Ok(credential)
    }

    async fn get_password_hash(&self, user_id: &str) -> AppResult<Option<String>> {
        match self.cache.get(user_id).await {
            Ok(Some(credential)) => {
                debug!(user_id = %user_id, "Credential cache hit");
                return Ok(Some(credential.password_hash));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Credential cache read failed, using repository");
            }
        }
        self.inner.get_password_hash(user_id).await
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        self.inner.update_password_hash(user_id, password_hash).await?;
        self.invalidate(user_id).await;
        Ok(())
    }

    async fn update_last_login(&self, user_id: &str) -> AppResult<()> {
        self.inner.update_last_login(user_id).await?;
        self.invalidate(user_id).await;
        Ok(())
    }
}
