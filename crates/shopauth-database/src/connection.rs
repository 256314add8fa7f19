//! PostgreSQL pool for the credential store.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use shopauth_core::config::{DatabaseConfig, mask_url};
use shopauth_core::error::{AppError, ErrorKind};
use shopauth_core::result::AppResult;

/// Columns of `users` the credential repository reads or writes.
pub const CREDENTIAL_COLUMNS: [&str; 7] = [
    "id",
    "email",
    "role",
    "password_hash",
    "active",
    "last_login_at",
    "updated_at",
];

/// Shared sqlx pool over the database that owns the `users` table.
///
/// ShopAuth never migrates that table; it only checks at startup that the
/// columns it depends on are there.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let target = mask_url(&config.url);
        info!(
            url = %target,
            max_connections = config.max_connections,
            "Opening credential database pool"
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Cannot reach credential database at {target}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fail unless every column in [`CREDENTIAL_COLUMNS`] exists on `users`.
    pub async fn verify_schema(&self) -> AppResult<()> {
        let present: Vec<String> = sqlx::query_scalar(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_name = 'users' AND column_name = ANY($1)",
        )
        .bind(CREDENTIAL_COLUMNS.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Cannot inspect users table", e))?;

        let missing = missing_columns(&present);
        if missing.is_empty() {
            info!("Credential columns present on users table");
            Ok(())
        } else {
            warn!(missing = ?missing, "users table lacks credential columns");
            Err(AppError::database(format!(
                "users table is missing columns: {}",
                missing.join(", ")
            )))
        }
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> AppResult<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Database ping failed", e))?;
        Ok(one == 1)
    }

    /// Drain and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Credential database pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

fn missing_columns(present: &[String]) -> Vec<&'static str> {
    CREDENTIAL_COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|p| p.as_str() == *column))
        .collect()
}
