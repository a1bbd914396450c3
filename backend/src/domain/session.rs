//! Bearer session resolution.
//!
//! Every protected request goes through [`CachedSessionResolver`]: the
//! bearer token is verified, then the user is read from the session cache
//! and only on a miss from the user repository, after which the cache is
//! repopulated for the token's validity window.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Error, UserId, UserProfile};
use crate::domain::ports::{
    SessionCache, SessionCacheKey, SessionResolver, TokenService, UserPersistenceError,
    UserRepository,
};

pub const AUTHORIZATION_MISSING_MESSAGE: &str = "Authorization header missing";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid Authorization Token";
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// The authenticated caller attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub profile: UserProfile,
    /// True when the profile came from the session cache.
    pub is_cached: bool,
}

impl CurrentUser {
    pub fn user_id(&self) -> &UserId {
        &self.profile.user_id
    }
}

/// Status class reported for authentication failures.
///
/// `Legacy` keeps the 500 answers existing clients were built against;
/// `Unauthorized` reports conventional 401s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthFailureStatus {
    #[default]
    Legacy,
    Unauthorized,
}

impl AuthFailureStatus {
    /// Build the error for an authentication failure with `message`.
    pub fn error(self, message: &str) -> Error {
        match self {
            Self::Legacy => Error::authentication_failed(message),
            Self::Unauthorized => Error::unauthorized(message),
        }
    }
}

/// Unknown value for [`AuthFailureStatus`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("auth failure status must be `legacy` or `unauthorized`, got `{0}`")]
pub struct ParseAuthFailureStatusError(String);

impl FromStr for AuthFailureStatus {
    type Err = ParseAuthFailureStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "unauthorized" | "401" => Ok(Self::Unauthorized),
            _ => Err(ParseAuthFailureStatusError(s.to_owned())),
        }
    }
}

/// Extract the token from a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Cache-first [`SessionResolver`].
pub struct CachedSessionResolver<U: ?Sized, C: ?Sized, T: ?Sized> {
    users: Arc<U>,
    cache: Arc<C>,
    tokens: Arc<T>,
    failure_status: AuthFailureStatus,
}

impl<U: ?Sized, C: ?Sized, T: ?Sized> CachedSessionResolver<U, C, T> {
    pub fn new(users: Arc<U>, cache: Arc<C>, tokens: Arc<T>) -> Self {
        Self {
            users,
            cache,
            tokens,
            failure_status: AuthFailureStatus::default(),
        }
    }

    /// Choose how authentication failures are reported.
    #[must_use]
    pub fn with_failure_status(mut self, failure_status: AuthFailureStatus) -> Self {
        self.failure_status = failure_status;
        self
    }

    fn reject(&self, message: &str) -> Error {
        self.failure_status.error(message)
    }
}

#[async_trait]
impl<U, C, T> SessionResolver for CachedSessionResolver<U, C, T>
where
    U: UserRepository + ?Sized,
    C: SessionCache + ?Sized,
    T: TokenService + ?Sized,
{
    async fn resolve(&self, authorization: Option<&str>) -> Result<CurrentUser, Error> {
        let header = authorization.ok_or_else(|| self.reject(AUTHORIZATION_MISSING_MESSAGE))?;
        let token = bearer_token(header).ok_or_else(|| self.reject(INVALID_TOKEN_MESSAGE))?;
        let user_id = self.tokens.verify(token).map_err(|error| {
            debug!(%error, "bearer token rejected");
            self.reject(INVALID_TOKEN_MESSAGE)
        })?;

        let key = SessionCacheKey::for_user(&user_id);
        match self.cache.get(&key).await {
            Ok(Some(profile)) if profile.user_id == user_id => {
                return Ok(CurrentUser {
                    profile,
                    is_cached: true,
                });
            }
            Ok(Some(_)) => warn!(%key, "cached session belongs to another user; ignoring"),
            Ok(None) => {}
            Err(error) => warn!(%error, kind = error.kind(), %key, "session cache read failed"),
        }

        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| self.reject(USER_NOT_FOUND_MESSAGE))?;
        let profile = user.into_profile();

        if let Err(error) = self.cache.set(&key, &profile, self.tokens.validity()).await {
            warn!(%error, kind = error.kind(), %key, "session cache write failed");
        }

        Ok(CurrentUser {
            profile,
            is_cached: false,
        })
    }
}
