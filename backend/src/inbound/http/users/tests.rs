//! Tests for account API handlers.

use super::*;
use crate::domain::ports::{IssuedToken, MockAccountService, MockDocumentService};
use crate::inbound::http::test_utils::{
    CACHED_TOKEN, FIXTURE_USER_ID, GOOD_TOKEN, fixture_profile, fixture_time, fixture_user_id,
    state_with,
};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

fn issued_session() -> AccountSession {
    AccountSession {
        profile: fixture_profile(),
        token: IssuedToken {
            token: "signed.jwt.token".into(),
            expires_at: fixture_time(),
        },
    }
}

async fn send(accounts: MockAccountService, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(state_with(accounts, MockDocumentService::new()))
            .service(
                web::scope("/v1")
                    .service(register)
                    .service(login)
                    .service(session)
                    .service(update_profile),
            ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    (status, actix_test::read_body_json(response).await)
}

#[actix_web::test]
async fn register_returns_profile_and_token() {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_register()
        .withf(|details| details.email().as_str() == "ada@example.com" && details.first_name() == "Ada")
        .times(1)
        .returning(|_| Ok(issued_session()));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/register")
            .set_json(json!({"firstName": "Ada", "email": "ada@example.com", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], REGISTERED_MESSAGE);
    assert_eq!(body["data"]["userId"], FIXTURE_USER_ID);
    assert_eq!(body["data"]["token"], "signed.jwt.token");
    assert_eq!(body["data"].get("passwordHash"), None);
    assert_eq!(body["data"].get("password"), None);
}

#[rstest]
#[case(json!({"email": "ada@example.com", "password": "pw"}))]
#[case(json!({"firstName": "  ", "email": "ada@example.com", "password": "pw"}))]
#[case(json!({"firstName": "Ada", "email": "ada@example.com"}))]
#[case(json!({}))]
#[actix_web::test]
async fn register_requires_fields(#[case] payload: Value) {
    let mut accounts = MockAccountService::new();
    accounts.expect_register().times(0);

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/register")
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Required fields are missing");
    assert_eq!(
        body["requiredFields"],
        json!(["firstName", "email", "password"])
    );
}

#[actix_web::test]
async fn register_rejects_malformed_email() {
    let mut accounts = MockAccountService::new();
    accounts.expect_register().times(0);

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/register")
            .set_json(json!({"firstName": "Ada", "email": "not-an-email", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email address");
}

#[actix_web::test]
async fn login_requires_email_and_password() {
    let mut accounts = MockAccountService::new();
    accounts.expect_login().times(0);

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/login")
            .set_json(json!({"email": "ada@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["requiredFields"], json!(["email", "password"]));
}

#[rstest]
#[case("User not found, please register first")]
#[case("Invalid password")]
#[actix_web::test]
async fn login_surfaces_credential_failures(#[case] message: &'static str) {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_login()
        .times(1)
        .returning(move |_| Err(Error::invalid_request(message)));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "wrong"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn login_returns_profile_and_token() {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_login()
        .withf(|credentials| credentials.password() == "pw")
        .times(1)
        .returning(|_| Ok(issued_session()));

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::post()
            .uri("/v1/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], LOGGED_IN_MESSAGE);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["token"], "signed.jwt.token");
}

#[rstest]
#[case(GOOD_TOKEN, None)]
#[case(CACHED_TOKEN, Some(true))]
#[actix_web::test]
async fn session_reports_cache_origin(#[case] token: &str, #[case] cached: Option<bool>) {
    let (status, body) = send(
        MockAccountService::new(),
        actix_test::TestRequest::get()
            .uri("/v1/auth/session")
            .insert_header((AUTHORIZATION, token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], SESSION_MESSAGE);
    assert_eq!(body["data"]["userId"], FIXTURE_USER_ID);
    assert_eq!(body["data"].get("isCached").and_then(Value::as_bool), cached);
}

#[actix_web::test]
async fn session_without_header_is_rejected() {
    let (status, body) = send(
        MockAccountService::new(),
        actix_test::TestRequest::get().uri("/v1/auth/session"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Authorization header missing");
}

#[rstest]
#[case(json!({}), "No data provided for update", None)]
#[case(json!({"firstName": null}), "No data provided for update", None)]
#[case(
    json!({"email": "eve@example.com"}),
    "Invalid fields in update data",
    Some(json!(["firstName", "lastName"]))
)]
#[actix_web::test]
async fn profile_updates_are_validated_before_the_service(
    #[case] payload: Value,
    #[case] message: &str,
    #[case] allowed: Option<Value>,
) {
    let mut accounts = MockAccountService::new();
    accounts.expect_update_profile().times(0);

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::patch()
            .uri("/v1/auth/profile")
            .insert_header((AUTHORIZATION, GOOD_TOKEN))
            .set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], message);
    assert_eq!(body.get("allowedFields").cloned(), allowed);
}

#[actix_web::test]
async fn profile_updates_apply_to_the_caller() {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_update_profile()
        .withf(|user_id, changes| {
            *user_id == fixture_user_id() && changes.last_name.as_deref() == Some("Lovelace")
        })
        .times(1)
        .returning(|_, _| {
            let mut profile = fixture_profile();
            profile.last_name = Some("Lovelace".into());
            Ok(profile)
        });

    let (status, body) = send(
        accounts,
        actix_test::TestRequest::patch()
            .uri("/v1/auth/profile")
            .insert_header((AUTHORIZATION, GOOD_TOKEN))
            .set_json(json!({"lastName": "Lovelace"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], PROFILE_UPDATED_MESSAGE);
    assert_eq!(body["data"]["lastName"], "Lovelace");
}
