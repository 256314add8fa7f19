//! Session records as `SET EX` strings, session indexes as Redis sets.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::info;

use shopauth_core::config::cache::RedisCacheConfig;
use shopauth_core::config::mask_url;
use shopauth_core::error::{AppError, ErrorKind};
use shopauth_core::result::AppResult;
use shopauth_core::traits::cache::CacheProvider;

/// Redis-backed provider.
///
/// String entries carry a server-side TTL. Set keys carry none, so a
/// user's session index outlives the sessions it names until pruned.
#[derive(Clone)]
pub struct RedisCacheProvider {
    /// Multiplexed connection; reconnects on its own.
    conn: ConnectionManager,
    /// Prepended to every key. Empty by default.
    key_prefix: String,
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RedisCacheProvider {
    /// Connect to the server named in `config`.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(
            url = %mask_url(&config.url),
            key_prefix = %config.key_prefix,
            "Connecting to Redis session store"
        );

        let client = Client::open(config.url.as_str())
            .map_err(|e| AppError::with_source(ErrorKind::Cache, "Invalid Redis URL", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Cache, "Redis session store unreachable", e))?;

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

/// `SET EX` rejects a zero expiry, so sub-second TTLs round up.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(self.key(key)).await.map_err(Self::map_err)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(self.key(key), value, expiry_seconds(ttl))
            .await
            .map_err(Self::map_err)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(key)).await.map_err(Self::map_err)
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.sadd::<_, _, ()>(self.key(key), member)
            .await
            .map_err(Self::map_err)
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(self.key(key)).await.map_err(Self::map_err)
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(self.key(key), member)
            .await
            .map_err(Self::map_err)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
