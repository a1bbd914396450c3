//! Port for issuing and verifying bearer tokens.
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing or verifying tokens.
    pub enum TokenError {
        /// The token is malformed, tampered with, or expired.
        Invalid { message: String } => "token rejected: {message}",
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless bearer token issuer and verifier.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Issue a token for `user_id` valid for [`TokenService::validity`].
    fn sign(&self, user_id: &UserId) -> Result<IssuedToken, TokenError>;

    /// Verify `token` and return the user it was issued for.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;

    /// Validity window of issued tokens.
    fn validity(&self) -> Duration;
}
