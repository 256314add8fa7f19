//! PostgreSQL credential repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use shopauth_core::error::{AppError, ErrorKind};
use shopauth_core::result::AppResult;
use shopauth_core::traits::{Credential, CredentialRepository};

/// Credential columns of the `users` table.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: String,
    email: String,
    role: String,
    password_hash: String,
    active: bool,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Self {
            user_id: row.id,
            email: row.email,
            role: row.role,
            password_hash: row.password_hash,
            active: row.active,
        }
    }
}

/// Reads and updates credentials in the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialRepository {
    pool: PgPool,
}

impl PgCredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn get_credential_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, role, password_hash, active FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Credential::from))
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find credential by email", e))
    }

    async fn get_password_hash(&self, user_id: &str) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch password hash", e))
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update password hash", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn update_last_login(&self, user_id: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update last login", e))?;
        Ok(())
    }
}
