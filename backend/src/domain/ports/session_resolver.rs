//! Driving port resolving a request's bearer credential to a user.
use async_trait::async_trait;

use crate::domain::{CurrentUser, Error};

/// Resolves the `Authorization` header value of a request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve the caller, or fail with an authentication error.
    ///
    /// `authorization` is the raw header value, `None` when absent.
    async fn resolve(&self, authorization: Option<&str>) -> Result<CurrentUser, Error>;
}
