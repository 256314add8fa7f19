//! The login protocol: login, logout, refresh, access validation, and
//! session management composed from the password, token, and session
//! components.

use std::sync::Arc;

use tracing::{debug, warn};

use shopauth_core::config::{AuthConfig, FeatureFlags};
use shopauth_core::events::{AuthEvent, LoginFailure};
use shopauth_core::traits::{Credential, CredentialRepository, EventSink};

use crate::error::{AuthError, AuthResult};
use crate::jwt::{AccessClaims, Identity, IssuedToken, TokenIssuer};
use crate::password::{PasswordAuthenticator, PasswordPolicy, Verification};
use crate::session::{Session, SessionStore};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Access token bound to `session`.
    pub token: IssuedToken,
    /// The newly opened session.
    pub session: Session,
    /// The authenticated user.
    pub user: Identity,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The replacement token.
    pub token: IssuedToken,
    /// The session with its extended expiry.
    pub session: Session,
}

/// Composes credential lookup, password verification, sessions, and tokens.
///
/// All components are shared through `Arc`; nothing here takes a lock, so
/// concurrent requests for the same user interleave freely.
#[derive(Clone)]
pub struct LoginOrchestrator {
    /// Credential repository.
    credentials: Arc<dyn CredentialRepository>,
    /// Password verification and hashing.
    passwords: Arc<PasswordAuthenticator>,
    /// Rules for new passwords.
    policy: PasswordPolicy,
    /// Token issuance and validation.
    tokens: Arc<TokenIssuer>,
    /// Session persistence.
    sessions: Arc<SessionStore>,
    /// Rehash legacy passwords after a successful login.
    migrate_on_login: bool,
    /// Event sink.
    events: Arc<dyn EventSink>,
}

impl std::fmt::Debug for LoginOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOrchestrator")
            .field("credentials", &self.credentials)
            .field("migrate_on_login", &self.migrate_on_login)
            .field("legacy_enabled", &self.passwords.legacy_enabled())
            .finish()
    }
}

impl LoginOrchestrator {
    /// Creates an orchestrator over the given components.
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        passwords: Arc<PasswordAuthenticator>,
        tokens: Arc<TokenIssuer>,
        sessions: Arc<SessionStore>,
        config: &AuthConfig,
        features: &FeatureFlags,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            credentials,
            passwords,
            policy: PasswordPolicy::new(config),
            tokens,
            sessions,
            migrate_on_login: features.enable_password_migration,
            events,
        }
    }

    /// Authenticate with email and password and open a session.
    ///
    /// 1. Fetch the credential by email
    /// 2. Verify the password (a decoy verification runs for unknown emails)
    /// 3. Check the account is active
    /// 4. Migrate a legacy hash, best effort
    /// 5. Create the session
    /// 6. Issue a token bound to it
    /// 7. Record the login time in the background
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`.
    /// `AccountInactive` is only reported once the password has verified.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: &str,
        user_agent: &str,
    ) -> AuthResult<LoginOutcome> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        // Step 1: Find credential
        let Some(credential) = self.credentials.get_credential_by_email(email).await? else {
            let attempt = password.to_string();
            self.blocking(move |p| p.verify_decoy(&attempt)).await?;
            self.login_failed(email, LoginFailure::UnknownAccount);
            return Err(AuthError::InvalidCredentials);
        };

        // Step 2: Verify password
        let verification = self.verify(password, &credential.password_hash).await?;
        if !verification.valid {
            self.login_failed(email, LoginFailure::WrongPassword);
            return Err(AuthError::InvalidCredentials);
        }

        // Step 3: Check account status
        if !credential.active {
            self.login_failed(email, LoginFailure::InactiveAccount);
            return Err(AuthError::AccountInactive);
        }

        // Step 4: Migrate legacy hash
        if verification.needs_migration && self.migrate_on_login {
            self.migrate_hash(&credential, password).await;
        }

        // Step 5: Create session
        let identity = Identity {
            user_id: credential.user_id.clone(),
            email: credential.email.clone(),
            role: credential.role.clone(),
        };
        let session = self.sessions.create(&identity, ip_address, user_agent).await?;

        // Step 6: Issue token
        let token = self.tokens.issue(&identity, &session.id)?;

        // Step 7: Last-login bookkeeping
        self.record_last_login(&credential.user_id);

        self.events.emit(AuthEvent::LoginSucceeded {
            user_id: identity.user_id.clone(),
            session_id: session.id.clone(),
            ip_address: ip_address.to_string(),
        });

        Ok(LoginOutcome {
            token,
            session,
            user: identity,
        })
    }

    /// End one session. Logging out of an absent session succeeds.
    pub async fn logout(&self, session_id: &str) -> AuthResult<()> {
        self.sessions.delete(session_id).await
    }

    /// End every session of a user. Returns how many were removed.
    pub async fn logout_all(&self, user_id: &str) -> AuthResult<usize> {
        self.sessions.delete_all_for_user(user_id).await
    }

    /// Exchange a valid or merely expired token for a fresh one.
    ///
    /// The session the token names must still be live; a deleted, expired,
    /// or revoked session blocks the refresh however good the signature is.
    pub async fn refresh_token(&self, token: &str) -> AuthResult<RefreshOutcome> {
        let claims = self.tokens.validate_allowing_expiry(token)?;
        let session_id = claims.session_id().ok_or(AuthError::ClaimsInvalid)?;

        let session = self.sessions.get(session_id).await?;
        ensure_owner(&session, &claims)?;

        let session = self.sessions.refresh(session_id).await?;
        let token = self.tokens.reissue(&claims)?;

        debug!(user_id = %claims.user_id, session_id = %session.id, "Token refreshed");
        Ok(RefreshOutcome { token, session })
    }

    /// Validate a token and, when it names a session, confirm that session is live.
    pub async fn validate_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let claims = self.tokens.validate(token)?;
        if let Some(session_id) = claims.session_id() {
            let session = self.sessions.get(session_id).await?;
            ensure_owner(&session, &claims)?;
        }
        Ok(claims)
    }

    /// Revoke a session by id regardless of owner.
    pub async fn revoke_session(&self, session_id: &str) -> AuthResult<()> {
        self.sessions.revoke(session_id).await?;
        Ok(())
    }

    /// Revoke a session only if it belongs to `user_id`.
    ///
    /// A session of another user is reported as not found.
    pub async fn revoke_user_session(&self, user_id: &str, session_id: &str) -> AuthResult<()> {
        let session = self.sessions.get(session_id).await?;
        if session.user_id != user_id {
            return Err(AuthError::SessionNotFound);
        }
        self.revoke_session(session_id).await
    }

    /// Live sessions of a user, newest first.
    pub async fn list_sessions(&self, user_id: &str) -> AuthResult<Vec<Session>> {
        self.sessions.list_for_user(user_id).await
    }

    /// Replace a user's password after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let stored = self
            .credentials
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify(current_password, &stored).await?.valid {
            return Err(AuthError::PasswordMismatch);
        }

        self.policy.validate(new_password)?;

        let new_password = new_password.to_string();
        let hash = self.blocking(move |p| p.hash(&new_password)).await??;
        self.credentials.update_password_hash(user_id, &hash).await?;

        self.events.emit(AuthEvent::PasswordChanged {
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    async fn verify(&self, password: &str, hash: &str) -> AuthResult<Verification> {
        let password = password.to_string();
        let hash = hash.to_string();
        self.blocking(move |p| p.verify(&password, &hash)).await
    }

    /// Rehash and persist. Failures are reported, never returned.
    async fn migrate_hash(&self, credential: &Credential, password: &str) {
        let from_scheme = self.passwords.classify(&credential.password_hash);
        let password = password.to_string();

        let result = match self.blocking(move |p| p.migrate(&password)).await {
            Ok(Ok(hash)) => self
                .credentials
                .update_password_hash(&credential.user_id, &hash)
                .await
                .map_err(AuthError::from),
            Ok(Err(e)) | Err(e) => Err(e),
        };

        match result {
            Ok(()) => self.events.emit(AuthEvent::PasswordMigrated {
                user_id: credential.user_id.clone(),
                from_scheme: from_scheme.to_string(),
            }),
            Err(e) => self.events.emit(AuthEvent::PasswordMigrationFailed {
                user_id: credential.user_id.clone(),
                error: e.to_string(),
            }),
        }
    }

    fn record_last_login(&self, user_id: &str) {
        let credentials = Arc::clone(&self.credentials);
        let events = Arc::clone(&self.events);
        let user_id = user_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = credentials.update_last_login(&user_id).await {
                warn!(user_id = %user_id, error = %e, "Last-login update failed");
                events.emit(AuthEvent::LastLoginUpdateFailed {
                    user_id,
                    error: e.to_string(),
                });
            }
        });
    }

    fn login_failed(&self, email: &str, reason: LoginFailure) {
        self.events.emit(AuthEvent::LoginFailed {
            email: email.to_string(),
            reason,
        });
    }

    /// Run CPU-bound password work on the blocking pool.
    async fn blocking<T, F>(&self, work: F) -> AuthResult<T>
    where
        F: FnOnce(&PasswordAuthenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let passwords = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || work(&passwords))
            .await
            .map_err(|e| AuthError::Hashing(format!("password task failed: {e}")))
    }
}

/// A token may only speak for the session's own user.
fn ensure_owner(session: &Session, claims: &AccessClaims) -> AuthResult<()> {
    if session.user_id == claims.user_id {
        Ok(())
    } else {
        Err(AuthError::SessionInvalid)
    }
}

