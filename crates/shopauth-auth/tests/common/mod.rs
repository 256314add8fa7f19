//! Shared fixtures for the protocol tests.

#![allow(dead_code)]

use std::sync::Arc;

use md5::{Digest, Md5};

use shopauth_auth::{LoginOrchestrator, PasswordAuthenticator, SessionStore, TokenIssuer};
use shopauth_cache::memory::MemoryCacheProvider;
use shopauth_core::config::{AuthConfig, FeatureFlags, SessionConfig};
use shopauth_core::events::MemoryEventSink;
use shopauth_core::traits::{Credential, CredentialRepository};
use shopauth_database::InMemoryCredentialRepository;

/// Secret every fixture signs with.
pub const SECRET: &str = "integration-test-secret";

/// A fully wired core over in-memory backends.
pub struct TestAuth {
    /// The orchestrator under test.
    pub orchestrator: LoginOrchestrator,
    /// Credential store behind the orchestrator.
    pub repo: InMemoryCredentialRepository,
    /// Session backend.
    pub backend: Arc<MemoryCacheProvider>,
    /// Token issuer shared with the orchestrator.
    pub tokens: Arc<TokenIssuer>,
    /// Password authenticator shared with the orchestrator.
    pub passwords: Arc<PasswordAuthenticator>,
    /// Captured events.
    pub events: Arc<MemoryEventSink>,
}

impl TestAuth {
    /// Legacy verification and migration both on.
    pub fn new() -> Self {
        Self::with_features(FeatureFlags {
            enable_legacy_auth: true,
            enable_password_migration: true,
        })
    }

    /// Core with the given feature flags over an in-memory repository.
    pub fn with_features(features: FeatureFlags) -> Self {
        let repo = InMemoryCredentialRepository::new();
        Self::build(features, repo.clone(), Arc::new(repo))
    }

    /// Core whose orchestrator talks to `credentials`; `repo` is still
    /// exposed for seeding when `credentials` wraps it.
    pub fn build(
        features: FeatureFlags,
        repo: InMemoryCredentialRepository,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        let config = auth_config();
        let events = Arc::new(MemoryEventSink::new());
        let backend = Arc::new(MemoryCacheProvider::default());

        let passwords = Arc::new(PasswordAuthenticator::new(&config, &features, events.clone()));
        let tokens = Arc::new(TokenIssuer::new(&config, events.clone()));
        let sessions = Arc::new(SessionStore::new(
            backend.clone(),
            &SessionConfig::default(),
            events.clone(),
        ));

        let orchestrator = LoginOrchestrator::new(
            credentials,
            passwords.clone(),
            tokens.clone(),
            sessions,
            &config,
            &features,
            events.clone(),
        );

        Self {
            orchestrator,
            repo,
            backend,
            tokens,
            passwords,
            events,
        }
    }

    /// Seed an account whose stored hash is `password_hash`.
    pub fn add_user(&self, user_id: &str, email: &str, password_hash: &str, active: bool) {
        self.repo.insert(Credential {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role: "customer".to_string(),
            password_hash: password_hash.to_string(),
            active,
        });
    }

    /// Seed an active account with a bcrypt hash of `password`.
    pub fn add_bcrypt_user(&self, user_id: &str, email: &str, password: &str) {
        let hash = self.passwords.migrate(password).unwrap();
        self.add_user(user_id, email, &hash, true);
    }

    /// Log in from a fixed client.
    pub async fn login(&self, email: &str, password: &str) -> shopauth_auth::AuthResult<shopauth_auth::LoginOutcome> {
        self.orchestrator
            .login(email, password, "203.0.113.7", "test-agent/1.0")
            .await
    }
}

/// Auth configuration with a cheap bcrypt cost.
pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.to_string(),
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

/// Unsalted MD5 hex digest, as legacy accounts stored it.
pub fn md5_hex(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

/// Unsalted SHA-1 hex digest, as legacy accounts stored it.
pub fn sha1_hex(password: &str) -> String {
    use sha1::Sha1;
    hex::encode(Sha1::digest(password.as_bytes()))
}
