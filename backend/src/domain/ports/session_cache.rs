//! Port interface for caching resolved session profiles.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the session cache adapter.
    pub enum SessionCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "session cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "session cache serialisation failed: {message}",
    }
}

/// Cache key for a user's session snapshot: `user-{id}-session`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionCacheKey(String);

impl SessionCacheKey {
    /// Key for the given user.
    pub fn for_user(user_id: &UserId) -> Self {
        Self(format!("user-{user_id}-session"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for SessionCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value store for session snapshots.
///
/// Entries are point-in-time copies bounded by their TTL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Read the snapshot stored under `key`.
    async fn get(&self, key: &SessionCacheKey) -> Result<Option<UserProfile>, SessionCacheError>;

    /// Store `profile` under `key` for `ttl`.
    async fn set(
        &self,
        key: &SessionCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), SessionCacheError>;

    /// Drop the entry under `key`, if any.
    async fn delete(&self, key: &SessionCacheKey) -> Result<(), SessionCacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn key_embeds_user_id() {
        let user_id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let key = SessionCacheKey::for_user(&user_id);
        assert_eq!(key.as_str(), "user-3fa85f64-5717-4562-b3fc-2c963f66afa6-session");
    }
}
