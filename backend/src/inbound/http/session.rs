//! Bearer session extractor.
//!
//! Handlers that take [`Authenticated`] only run once the request's
//! `Authorization` header has been resolved to a user; any failure
//! short-circuits with the resolver's error.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use super::state::HttpState;
use crate::domain::{CurrentUser, Error, UserId};

/// The resolved caller of a protected endpoint.
#[derive(Debug, Clone)]
pub struct Authenticated(pub CurrentUser);

impl Authenticated {
    pub fn user_id(&self) -> &UserId {
        self.0.user_id()
    }

    pub fn into_inner(self) -> CurrentUser {
        self.0
    }
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        // A header that is present but not valid UTF-8 is malformed, not missing.
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default().to_owned());

        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let current = state.sessions.resolve(header.as_deref()).await?;
            Ok(Self(current))
        })
    }
}
