//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use actix_web::web;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{
    AccountService, DocumentService, MockAccountService, MockDocumentService, SessionResolver,
};
use crate::domain::{CurrentUser, EmailAddress, Error, UserId, UserProfile};
use crate::inbound::http::state::HttpState;

pub const FIXTURE_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const GOOD_TOKEN: &str = "Bearer good";
pub const CACHED_TOKEN: &str = "Bearer cached";

pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn fixture_user_id() -> UserId {
    UserId::new(FIXTURE_USER_ID).expect("fixture id")
}

pub fn fixture_profile() -> UserProfile {
    UserProfile {
        user_id: fixture_user_id(),
        first_name: "Ada".into(),
        last_name: None,
        email: EmailAddress::new("ada@example.com").expect("fixture email"),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

/// Resolves [`GOOD_TOKEN`] and [`CACHED_TOKEN`] to the fixture user.
pub struct StubSessions;

#[async_trait]
impl SessionResolver for StubSessions {
    async fn resolve(&self, authorization: Option<&str>) -> Result<CurrentUser, Error> {
        match authorization {
            None => Err(Error::authentication_failed("Authorization header missing")),
            Some(GOOD_TOKEN) => Ok(CurrentUser {
                profile: fixture_profile(),
                is_cached: false,
            }),
            Some(CACHED_TOKEN) => Ok(CurrentUser {
                profile: fixture_profile(),
                is_cached: true,
            }),
            Some(_) => Err(Error::authentication_failed("Invalid Authorization Token")),
        }
    }
}

/// State whose account and document ports are the given mocks.
pub fn state_with(
    accounts: MockAccountService,
    documents: MockDocumentService,
) -> web::Data<HttpState> {
    let accounts: Arc<dyn AccountService> = Arc::new(accounts);
    let documents: Arc<dyn DocumentService> = Arc::new(documents);
    web::Data::new(HttpState::new(accounts, Arc::new(StubSessions), documents))
}
