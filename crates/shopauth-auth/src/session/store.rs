//! Session persistence on top of a TTL-capable key/value backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use shopauth_cache::keys;
use shopauth_core::config::SessionConfig;
use shopauth_core::error::AppError;
use shopauth_core::events::AuthEvent;
use shopauth_core::traits::{CacheProvider, EventSink};

use super::model::Session;
use crate::error::{AuthError, AuthResult};
use crate::jwt::Identity;

/// Shortest TTL ever written; backends round anything smaller to "no expiry" or zero.
const MIN_TTL: Duration = Duration::from_secs(1);

/// Creates, reads, extends, revokes, and deletes sessions.
///
/// Each record lives under `session:<id>` with a backend TTL equal to its
/// remaining lifetime. The per-user index `user_sessions:<user_id>` has no
/// TTL and may hold dead ids; [`list_for_user`](Self::list_for_user) prunes
/// them.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Key/value backend.
    backend: Arc<dyn CacheProvider>,
    /// Lifetime of a new or refreshed session.
    lifetime: Duration,
    /// Event sink.
    events: Arc<dyn EventSink>,
}

impl SessionStore {
    /// Creates a store over `backend`.
    pub fn new(
        backend: Arc<dyn CacheProvider>,
        config: &SessionConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            backend,
            lifetime: Duration::from_secs(config.lifetime_hours.saturating_mul(3600)),
            events,
        }
    }

    /// Open a session for `identity` and add it to the user's index.
    pub async fn create(
        &self,
        identity: &Identity,
        ip_address: &str,
        user_agent: &str,
    ) -> AuthResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: format!("sess-{}", Uuid::new_v4().simple()),
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            created_at: now,
            expires_at: now + chrono_duration(self.lifetime),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            active: true,
        };

        self.write(&session, self.lifetime).await?;
        self.backend
            .set_add(&keys::user_sessions(&session.user_id), &session.id)
            .await?;

        self.events.emit(AuthEvent::SessionCreated {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
        });
        Ok(session)
    }

    /// Fetch a live session.
    ///
    /// Fails with `SessionNotFound` when the record is gone, `SessionInvalid`
    /// when it cannot be decoded, `SessionExpired` past `expires_at` (even if
    /// the backend has not evicted it yet), and `SessionRevoked` when inactive.
    pub async fn get(&self, session_id: &str) -> AuthResult<Session> {
        let session = self.load(session_id).await?;
        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }
        if !session.active {
            return Err(AuthError::SessionRevoked);
        }
        Ok(session)
    }

    /// Push `expires_at` to `now + lifetime` and rewrite with a fresh TTL.
    pub async fn refresh(&self, session_id: &str) -> AuthResult<Session> {
        let mut session = self.get(session_id).await?;
        session.expires_at = Utc::now() + chrono_duration(self.lifetime);
        self.write(&session, self.lifetime).await?;

        self.events.emit(AuthEvent::SessionRefreshed {
            session_id: session.id.clone(),
        });
        Ok(session)
    }

    /// Mark a session inactive, keeping its original expiry.
    ///
    /// Revoking an already revoked session succeeds.
    pub async fn revoke(&self, session_id: &str) -> AuthResult<Session> {
        let mut session = self.load(session_id).await?;
        let now = Utc::now();
        if session.is_expired(now) {
            return Err(AuthError::SessionExpired);
        }

        session.active = false;
        self.write(&session, session.remaining(now).max(MIN_TTL))
            .await?;

        self.events.emit(AuthEvent::SessionRevoked {
            session_id: session.id.clone(),
        });
        Ok(session)
    }

    /// Remove a session record. Deleting an absent session is not an error.
    ///
    /// The user's index keeps the id until the next listing prunes it.
    pub async fn delete(&self, session_id: &str) -> AuthResult<()> {
        self.backend.delete(&keys::session(session_id)).await?;
        self.events.emit(AuthEvent::SessionDeleted {
            session_id: session_id.to_string(),
        });
        Ok(())
    }

    /// Remove every session of a user together with the index.
    ///
    /// Returns the number of index entries processed.
    pub async fn delete_all_for_user(&self, user_id: &str) -> AuthResult<usize> {
        let index_key = keys::user_sessions(user_id);
        let ids = self.backend.set_members(&index_key).await?;

        for id in &ids {
            self.backend.delete(&keys::session(id)).await?;
        }
        self.backend.delete(&index_key).await?;

        self.events.emit(AuthEvent::SessionsPurged {
            user_id: user_id.to_string(),
            count: ids.len(),
        });
        Ok(ids.len())
    }

    /// Every live session of a user, newest first.
    ///
    /// Ids that no longer resolve to a live session are dropped from the
    /// index instead of failing the listing.
    pub async fn list_for_user(&self, user_id: &str) -> AuthResult<Vec<Session>> {
        let index_key = keys::user_sessions(user_id);
        let ids = self.backend.set_members(&index_key).await?;

        let mut sessions = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id).await {
                Ok(session) => sessions.push(session),
                Err(e) if e.is_session_error() => {
                    self.backend.set_remove(&index_key, &id).await?;
                    self.events.emit(AuthEvent::SessionIndexPruned {
                        user_id: user_id.to_string(),
                        session_id: id,
                    });
                }
                Err(e) => {
                    warn!(user_id = %user_id, session_id = %id, error = %e, "Skipping unreadable session");
                }
            }
        }

        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    /// Read and decode a record without judging its liveness.
    async fn load(&self, session_id: &str) -> AuthResult<Session> {
        let raw = self
            .backend
            .get(&keys::session(session_id))
            .await?
            .ok_or(AuthError::SessionNotFound)?;
        serde_json::from_str(&raw).map_err(|_| AuthError::SessionInvalid)
    }

    async fn write(&self, session: &Session, ttl: Duration) -> AuthResult<()> {
        let payload = serde_json::to_string(session).map_err(AppError::from)?;
        self.backend
            .set(&keys::session(&session.id), &payload, ttl)
            .await?;
        Ok(())
    }
}

fn chrono_duration(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
