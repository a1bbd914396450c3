//! Driving port for registration, login and profile edits.
use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, ProfileChanges, RegistrationDetails, UserId, UserProfile};

use super::IssuedToken;

/// A profile paired with a freshly issued bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSession {
    pub profile: UserProfile,
    pub token: IssuedToken,
}

/// Account use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create a user and issue a token for them.
    async fn register(&self, details: RegistrationDetails) -> Result<AccountSession, Error>;

    /// Check credentials and issue a token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AccountSession, Error>;

    /// Update the caller's profile and drop their cached session snapshot.
    async fn update_profile(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<UserProfile, Error>;
}
