//! In-memory credential repository for development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use shopauth_core::error::AppError;
use shopauth_core::result::AppResult;
use shopauth_core::traits::{Credential, CredentialRepository};

#[derive(Debug, Clone)]
struct StoredCredential {
    credential: Credential,
    last_login_at: Option<DateTime<Utc>>,
}

/// Keeps credentials in a concurrent map keyed by user ID.
///
/// Email lookups are case-insensitive, as in the PostgreSQL repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    users: Arc<DashMap<String, StoredCredential>>,
}

impl InMemoryCredentialRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a credential.
    pub fn insert(&self, credential: Credential) {
        self.users.insert(
            credential.user_id.clone(),
            StoredCredential {
                credential,
                last_login_at: None,
            },
        );
    }

    /// Current stored hash of a user.
    pub fn password_hash(&self, user_id: &str) -> Option<String> {
        self.users
            .get(user_id)
            .map(|entry| entry.credential.password_hash.clone())
    }

    /// Last recorded login of a user.
    pub fn last_login(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.users.get(user_id).and_then(|entry| entry.last_login_at)
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the repository holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn get_credential_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.credential.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.credential.clone()))
    }

    async fn get_password_hash(&self, user_id: &str) -> AppResult<Option<String>> {
        Ok(self.password_hash(user_id))
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> AppResult<()> {
        let mut entry = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        entry.credential.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_last_login(&self, user_id: &str) -> AppResult<()> {
        let mut entry = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        entry.last_login_at = Some(Utc::now());
        Ok(())
    }
}
