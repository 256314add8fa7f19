//! Policy enforcement for new passwords.

use shopauth_core::config::AuthConfig;
use zxcvbn::Score;

use crate::error::{AuthError, AuthResult};

/// Length and strength rules a new password must satisfy.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    /// Minimum length in bytes.
    min_length: usize,
    /// Maximum length in bytes.
    max_length: usize,
    /// Minimum zxcvbn score; `None` disables the strength check.
    min_strength: Option<Score>,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
            min_strength: match config.password_min_strength {
                0 => None,
                n => Score::try_from(n).ok(),
            },
        }
    }

    /// Check the length bounds only.
    ///
    /// Lengths are counted in bytes, the unit bcrypt truncates on.
    pub fn check_length(&self, password: &str) -> AuthResult<()> {
        if password.is_empty() {
            return Err(AuthError::PasswordEmpty);
        }
        if password.len() < self.min_length {
            return Err(AuthError::PasswordTooShort {
                min: self.min_length,
            });
        }
        if password.len() > self.max_length {
            return Err(AuthError::PasswordTooLong {
                max: self.max_length,
            });
        }
        Ok(())
    }

    /// Validate a password chosen by a user.
    pub fn validate(&self, password: &str) -> AuthResult<()> {
        self.check_length(password)?;
        match self.min_strength {
            Some(min) if zxcvbn::zxcvbn(password, &[]).score() < min => {
                Err(AuthError::PasswordTooWeak)
            }
            _ => Ok(()),
        }
    }
}
