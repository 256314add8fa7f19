//! Cache key builders for every entry ShopAuth writes.
//!
//! Session keys follow the layout other services on the platform read,
//! so they carry no application prefix of their own. A deployment-wide
//! prefix can still be configured on the Redis provider.

/// Key of the JSON session record.
pub fn session(session_id: &str) -> String {
    format!("session:{session_id}")
}

/// Key of the set holding every session id of a user.
pub fn user_sessions(user_id: &str) -> String {
    format!("user_sessions:{user_id}")
}

/// Key of a cached credential.
pub fn credential(user_id: &str) -> String {
    format!("credential:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(session("sess-abc"), "session:sess-abc");
        assert_eq!(user_sessions("42"), "user_sessions:42");
        assert_eq!(credential("42"), "credential:42");
    }
}
