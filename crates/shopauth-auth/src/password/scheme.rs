//! Password hash scheme classification.

use std::fmt;

/// Length of a bcrypt hash string (`$2b$12$` + 22 salt + 31 digest).
const BCRYPT_LEN: usize = 60;
/// Length of a hex MD5 digest.
const MD5_HEX_LEN: usize = 32;
/// Length of a hex SHA-1 digest.
const SHA1_HEX_LEN: usize = 40;

/// The algorithm a stored hash was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashScheme {
    /// bcrypt: salted and adaptive.
    Current,
    /// Unsalted SHA-1, lowercase hex.
    LegacyStrong,
    /// Unsalted MD5, lowercase hex.
    LegacyWeak,
    /// Anything else. Never verifies.
    Unknown,
}

impl HashScheme {
    /// Classify a stored hash from its shape alone.
    pub fn classify(hash: &str) -> Self {
        if hash.len() == BCRYPT_LEN && hash.starts_with("$2") {
            return Self::Current;
        }
        if !is_lower_hex(hash) {
            return Self::Unknown;
        }
        match hash.len() {
            MD5_HEX_LEN => Self::LegacyWeak,
            SHA1_HEX_LEN => Self::LegacyStrong,
            _ => Self::Unknown,
        }
    }

    /// Algorithm name for logs and events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "bcrypt",
            Self::LegacyStrong => "sha1",
            Self::LegacyWeak => "md5",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
