//! Account use-cases: registration, login and profile edits.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use super::{
    Error, LoginCredentials, NewUser, ProfileChanges, RegistrationDetails, UserId, UserProfile,
};
use crate::domain::ports::{
    AccountService, AccountSession, PasswordHashError, PasswordHasher, SessionCache,
    SessionCacheKey, TokenError, TokenService, UserPersistenceError, UserRepository,
};

pub const USER_EXISTS_MESSAGE: &str = "User already exists with email, try logging in";
pub const REGISTER_FAILED_MESSAGE: &str = "Failed to register user";
pub const UNKNOWN_EMAIL_MESSAGE: &str = "User not found, please register first";
pub const INVALID_PASSWORD_MESSAGE: &str = "Invalid password";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::invalid_request(USER_EXISTS_MESSAGE),
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing error: {error}"))
}

fn map_token_error(error: TokenError) -> Error {
    Error::internal(format!("token issue failed: {error}"))
}

/// [`AccountService`] backed by the credential store.
pub struct AccountServiceImpl<U: ?Sized, H: ?Sized, T: ?Sized, C: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    sessions: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<U: ?Sized, H: ?Sized, T: ?Sized, C: ?Sized> AccountServiceImpl<U, H, T, C> {
    pub fn new(
        users: Arc<U>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        sessions: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            sessions,
            clock,
        }
    }
}

impl<U, H, T, C> AccountServiceImpl<U, H, T, C>
where
    U: ?Sized,
    H: ?Sized,
    T: TokenService + ?Sized,
    C: ?Sized,
{
    fn session_for(&self, profile: UserProfile) -> Result<AccountSession, Error> {
        let token = self.tokens.sign(&profile.user_id).map_err(map_token_error)?;
        Ok(AccountSession { profile, token })
    }
}

#[async_trait]
impl<U, H, T, C> AccountService for AccountServiceImpl<U, H, T, C>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: TokenService + ?Sized,
    C: SessionCache + ?Sized,
{
    async fn register(&self, details: RegistrationDetails) -> Result<AccountSession, Error> {
        let existing = self
            .users
            .find_by_email(details.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request(USER_EXISTS_MESSAGE));
        }

        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hash_error)?;
        let new_user = NewUser {
            id: UserId::random(),
            first_name: details.first_name().to_owned(),
            last_name: details.last_name().map(str::to_owned),
            email: details.email().clone(),
            password_hash,
            created_at: self.clock.utc(),
        };

        let Some(user) = self.users.create(&new_user).await.map_err(map_user_error)? else {
            error!(user_id = %new_user.id, "user insert returned no row");
            return Err(Error::dependency_failed(REGISTER_FAILED_MESSAGE));
        };
        info!(user_id = %user.id, "user registered");
        self.session_for(user.into_profile())
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AccountSession, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::invalid_request(UNKNOWN_EMAIL_MESSAGE))?;

        let valid = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !valid {
            return Err(Error::invalid_request(INVALID_PASSWORD_MESSAGE));
        }
        self.session_for(user.into_profile())
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<UserProfile, Error> {
        let user = self
            .users
            .update(user_id, &changes, self.clock.utc())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;

        let key = SessionCacheKey::for_user(user_id);
        if let Err(error) = self.sessions.delete(&key).await {
            warn!(%error, %key, "failed to drop cached session after profile update");
        }
        Ok(user.into_profile())
    }
}
