//! Multi-scheme password verification and bcrypt hashing.

use std::sync::{Arc, OnceLock};

use md5::Md5;
use sha1::{Digest, Sha1};
use tracing::debug;

use shopauth_core::config::{AuthConfig, FeatureFlags};
use shopauth_core::events::AuthEvent;
use shopauth_core::traits::EventSink;

use super::policy::PasswordPolicy;
use super::scheme::HashScheme;
use crate::error::{AuthError, AuthResult};

/// bcrypt ignores input past this many bytes.
const MAX_BCRYPT_INPUT: usize = 72;

/// Input hashed once to build the decoy hash.
const DECOY_INPUT: &str = "shopauth-decoy-password";

/// Outcome of checking a password against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// The password matches the hash.
    pub valid: bool,
    /// The password matched a legacy hash and should be rehashed.
    pub needs_migration: bool,
}

impl Verification {
    /// A failed verification.
    pub const REJECTED: Self = Self {
        valid: false,
        needs_migration: false,
    };

    fn matched(scheme: HashScheme) -> Self {
        Self {
            valid: true,
            needs_migration: scheme != HashScheme::Current,
        }
    }
}

/// Verifies passwords against bcrypt and legacy digests, and hashes new ones.
///
/// Every hash it produces is bcrypt with a fresh random salt. Legacy MD5 and
/// SHA-1 digests verify only while `enable_legacy_auth` is on.
///
/// All methods are CPU-bound and synchronous; async callers should run them
/// on the blocking pool.
#[derive(Debug)]
pub struct PasswordAuthenticator {
    /// bcrypt cost for new hashes.
    cost: u32,
    /// Length rules applied before hashing.
    policy: PasswordPolicy,
    /// Whether MD5/SHA-1 hashes are accepted.
    legacy_enabled: bool,
    /// Lazily computed bcrypt hash used to equalise timing for unknown accounts.
    decoy: OnceLock<Option<String>>,
    /// Event sink.
    events: Arc<dyn EventSink>,
}

impl PasswordAuthenticator {
    /// Creates an authenticator from configuration.
    pub fn new(config: &AuthConfig, features: &FeatureFlags, events: Arc<dyn EventSink>) -> Self {
        Self {
            cost: config.bcrypt_cost,
            policy: PasswordPolicy::new(config),
            legacy_enabled: features.enable_legacy_auth,
            decoy: OnceLock::new(),
            events,
        }
    }

    /// Whether legacy digest verification is enabled.
    pub fn legacy_enabled(&self) -> bool {
        self.legacy_enabled
    }

    /// Hash a password under the current scheme.
    ///
    /// Rejects empty, too-short and too-long input before any hashing work.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        self.policy.check_length(password)?;
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Classify a stored hash.
    pub fn classify(&self, hash: &str) -> HashScheme {
        HashScheme::classify(hash)
    }

    /// Check a password against a stored hash of any supported scheme.
    pub fn verify(&self, password: &str, hash: &str) -> Verification {
        let scheme = HashScheme::classify(hash);
        let valid = match scheme {
            HashScheme::Current => match bcrypt::verify(password, hash) {
                Ok(valid) => valid,
                Err(e) => {
                    debug!(error = %e, "Malformed bcrypt hash");
                    false
                }
            },
            HashScheme::LegacyStrong | HashScheme::LegacyWeak if !self.legacy_enabled => {
                self.events.emit(AuthEvent::LegacyVerificationRefused {
                    scheme: scheme.to_string(),
                });
                false
            }
            HashScheme::LegacyStrong => sha1_hex(password) == hash,
            HashScheme::LegacyWeak => md5_hex(password) == hash,
            HashScheme::Unknown => false,
        };

        if valid {
            Verification::matched(scheme)
        } else {
            Verification::REJECTED
        }
    }

    /// Recompute a verified password under the current scheme.
    ///
    /// The old hash is never transformed; it carries nothing worth keeping.
    /// Only the bounds bcrypt itself needs apply here: a legacy password
    /// shorter than today's minimum still migrates.
    pub fn migrate(&self, password: &str) -> AuthResult<String> {
        if password.is_empty() {
            return Err(AuthError::PasswordEmpty);
        }
        if password.len() > MAX_BCRYPT_INPUT {
            return Err(AuthError::PasswordTooLong {
                max: MAX_BCRYPT_INPUT,
            });
        }
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Whether a stored hash should be replaced on the next successful login.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        HashScheme::classify(hash) != HashScheme::Current
    }

    /// Spend one bcrypt verification on a throwaway hash.
    ///
    /// Called when no account matches so that unknown-email and
    /// wrong-password responses cost the same.
    pub fn verify_decoy(&self, password: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| bcrypt::hash(DECOY_INPUT, self.cost).ok());
        if let Some(hash) = decoy {
            let _ = bcrypt::verify(password, hash);
        }
    }
}

fn md5_hex(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

fn sha1_hex(password: &str) -> String {
    hex::encode(Sha1::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopauth_core::events::MemoryEventSink;

    const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";
    const SHA1_PASSWORD: &str = "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8";

    fn authenticator(legacy: bool) -> (PasswordAuthenticator, Arc<MemoryEventSink>) {
        let sink = Arc::new(MemoryEventSink::new());
        let config = AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        };
        let features = FeatureFlags {
            enable_legacy_auth: legacy,
            enable_password_migration: true,
        };
        (
            PasswordAuthenticator::new(&config, &features, sink.clone()),
            sink,
        )
    }

    #[test]
    fn test_hash_then_verify() {
        let (auth, _) = authenticator(false);
        let hash = auth.hash("Secr3t!pw").unwrap();
        assert_eq!(hash.len(), 60);
        assert!(hash.starts_with("$2"));
        assert_eq!(auth.classify(&hash), HashScheme::Current);
        assert_eq!(
            auth.verify("Secr3t!pw", &hash),
            Verification {
                valid: true,
                needs_migration: false
            }
        );
        assert_eq!(auth.verify("wrong-password", &hash), Verification::REJECTED);
    }

    #[test]
    fn test_hashes_are_salted() {
        let (auth, _) = authenticator(false);
        let first = auth.hash("same-password").unwrap();
        let second = auth.hash("same-password").unwrap();
        assert_ne!(first, second);
        assert!(auth.verify("same-password", &first).valid);
        assert!(auth.verify("same-password", &second).valid);
    }

    #[test]
    fn test_hash_rejects_bad_input() {
        let (auth, _) = authenticator(false);
        assert!(matches!(auth.hash(""), Err(AuthError::PasswordEmpty)));
        assert!(matches!(
            auth.hash("1234567"),
            Err(AuthError::PasswordTooShort { .. })
        ));
        assert!(matches!(
            auth.hash(&"a".repeat(73)),
            Err(AuthError::PasswordTooLong { .. })
        ));
    }

    #[test]
    fn test_legacy_digests_when_enabled() {
        let (auth, _) = authenticator(true);
        let expected = Verification {
            valid: true,
            needs_migration: true,
        };
        assert_eq!(auth.verify("password", MD5_PASSWORD), expected);
        assert_eq!(auth.verify("password", SHA1_PASSWORD), expected);
        assert_eq!(auth.verify("Password", MD5_PASSWORD), Verification::REJECTED);
    }

    #[test]
    fn test_legacy_digests_when_disabled() {
        let (auth, sink) = authenticator(false);
        assert_eq!(auth.verify("password", MD5_PASSWORD), Verification::REJECTED);
        assert_eq!(auth.verify("password", SHA1_PASSWORD), Verification::REJECTED);
        assert_eq!(
            sink.names(),
            vec!["legacy_verification_refused", "legacy_verification_refused"]
        );
    }

    #[test]
    fn test_unknown_scheme_never_verifies() {
        let (auth, _) = authenticator(true);
        assert_eq!(auth.verify("password", "plaintext"), Verification::REJECTED);
        assert_eq!(auth.verify("password", ""), Verification::REJECTED);
    }

    #[test]
    fn test_malformed_bcrypt_is_rejected() {
        let (auth, _) = authenticator(false);
        let garbage = format!("$2b$04${}", "!".repeat(53));
        assert_eq!(auth.classify(&garbage), HashScheme::Current);
        assert_eq!(auth.verify("password", &garbage), Verification::REJECTED);
    }

    #[test]
    fn test_migrate_produces_current_hash() {
        let (auth, _) = authenticator(true);
        let legacy = md5_hex("Secr3t!pw");
        assert!(auth.verify("Secr3t!pw", &legacy).needs_migration);
        assert!(auth.needs_rehash(&legacy));

        let migrated = auth.migrate("Secr3t!pw").unwrap();
        assert!(!auth.needs_rehash(&migrated));
        assert_eq!(
            auth.verify("Secr3t!pw", &migrated),
            Verification {
                valid: true,
                needs_migration: false
            }
        );
    }

    #[test]
    fn test_migrate_accepts_short_legacy_password() {
        let (auth, _) = authenticator(true);
        let legacy = md5_hex("Secr3t!");
        assert!(auth.verify("Secr3t!", &legacy).needs_migration);
        assert!(auth.hash("Secr3t!").is_err());

        let migrated = auth.migrate("Secr3t!").unwrap();
        assert_eq!(auth.classify(&migrated), HashScheme::Current);
        assert!(auth.verify("Secr3t!", &migrated).valid);
    }

    #[test]
    fn test_decoy_verification_is_harmless() {
        let (auth, _) = authenticator(false);
        auth.verify_decoy("anything");
        auth.verify_decoy("anything");
    }

    #[test]
    fn test_digest_helpers() {
        assert_eq!(md5_hex("password"), MD5_PASSWORD);
        assert_eq!(sha1_hex("password"), SHA1_PASSWORD);
    }
}
