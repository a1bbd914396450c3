//! Account API handlers.
//!
//! ```text
//! POST  /v1/auth/register {"firstName":"Ada","email":"ada@example.com","password":"pw"}
//! POST  /v1/auth/login    {"email":"ada@example.com","password":"pw"}
//! GET   /v1/auth/session
//! PATCH /v1/auth/profile  {"lastName":"Lovelace"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

use super::ApiResult;
use super::envelope::{ErrorBodySchema, ok};
use super::session::Authenticated;
use super::state::HttpState;
use crate::domain::ports::AccountSession;
use crate::domain::{
    CredentialValidationError, Error, LoginCredentials, ProfileChanges, ProfileField,
    RegistrationDetails, UserProfile,
};

pub const REGISTERED_MESSAGE: &str = "User registered successfully";
pub const LOGGED_IN_MESSAGE: &str = "User logged in successfully";
pub const SESSION_MESSAGE: &str = "Session retrieved successfully";
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile updated successfully";

/// Registration request body.
///
/// Fields are optional on the wire so that absent and blank values report the
/// same "Required fields are missing" error.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<RegisterRequest> for RegistrationDetails {
    type Error = CredentialValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.first_name.as_deref(),
            value.last_name.as_deref(),
            value.email.as_deref(),
            value.password.as_deref(),
        )
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(value.email.as_deref(), value.password.as_deref())
    }
}

/// Profile plus the bearer token issued for it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountSessionBody {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

impl From<AccountSession> for AccountSessionBody {
    fn from(value: AccountSession) -> Self {
        Self {
            profile: value.profile,
            token: value.token.token,
        }
    }
}

/// The resolved caller; `isCached` is present when served from the cache.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionBody {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_cached: bool,
}

pub(crate) fn map_credential_error(err: CredentialValidationError) -> Error {
    match err {
        CredentialValidationError::MissingFields { required } => {
            Error::invalid_request(err.to_string()).with_detail("requiredFields", json!(required))
        }
        CredentialValidationError::InvalidEmail(_) | CredentialValidationError::InvalidName(_) => {
            Error::invalid_request(err.to_string())
        }
    }
}

/// Create an account and return it with a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = AccountSessionBody),
        (status = 400, description = "Missing fields, bad email or email taken", body = ErrorBodySchema),
        (status = 500, description = "Internal server error", body = ErrorBodySchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let details =
        RegistrationDetails::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let issued = state.accounts.register(details).await?;
    Ok(ok(REGISTERED_MESSAGE, AccountSessionBody::from(issued)))
}

/// Check credentials and return the profile with a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AccountSessionBody),
        (status = 400, description = "Missing fields, unknown email or wrong password", body = ErrorBodySchema),
        (status = 500, description = "Internal server error", body = ErrorBodySchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_credential_error)?;
    let issued = state.accounts.login(credentials).await?;
    Ok(ok(LOGGED_IN_MESSAGE, AccountSessionBody::from(issued)))
}

/// Return the caller resolved from the bearer token.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Current user", body = SessionBody),
        (status = 401, description = "Authentication failed", body = ErrorBodySchema),
        (status = 500, description = "Authentication failed (legacy status)", body = ErrorBodySchema)
    ),
    tags = ["auth"],
    operation_id = "getSession",
    security(("bearerAuth" = []))
)]
#[get("/auth/session")]
pub async fn session(user: Authenticated) -> HttpResponse {
    let current = user.into_inner();
    ok(
        SESSION_MESSAGE,
        SessionBody {
            profile: current.profile,
            is_cached: current.is_cached,
        },
    )
}

/// Change the caller's names. The cached session is dropped afterwards.
#[utoipa::path(
    patch,
    path = "/v1/auth/profile",
    request_body = Object,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Empty or invalid update", body = ErrorBodySchema),
        (status = 404, description = "User no longer exists", body = ErrorBodySchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile",
    security(("bearerAuth" = []))
)]
#[patch("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: Authenticated,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let changes = ProfileChanges::from_fields(&payload).map_err(|err| {
        err.into_error(ProfileField::UPDATABLE.map(ProfileField::api_name))
    })?;
    let profile = state.accounts.update_profile(user.user_id(), changes).await?;
    Ok(ok(PROFILE_UPDATED_MESSAGE, profile))
}

#[cfg(test)]
mod tests;
