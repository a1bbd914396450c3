//! In-process application harness backed by the in-memory adapters.
//!
//! Every test gets its own stores, a pinned clock and a real
//! [`JwtTokenService`], so token issuance and verification behave as in
//! production while persistence stays observable.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use mockable::Clock;
use serde_json::{Value, json};

use docvault::Trace;
use docvault::domain::{
    AccountServiceImpl, AuthFailureStatus, CachedSessionResolver, DocumentServiceImpl,
    DocumentSettings, TRACE_ID_HEADER,
};
use docvault::inbound::http::state::HttpState;
use docvault::inbound::http::{api_scope, json_config};
use docvault::outbound::token::JwtTokenService;
use docvault::test_support::{
    FixtureClock, InMemoryDocumentRepository, InMemoryObjectStore, InMemorySessionCache,
    InMemoryUserRepository, PlaintextPasswordHasher,
};

pub const TOKEN_VALIDITY: Duration = Duration::from_secs(3600);
pub const UPLOAD_LIMIT: usize = 64;
const SECRET: &[u8] = b"integration-secret";
const BOUNDARY: &str = "docvault-integration-boundary";

/// Adapters and state shared by one test.
pub struct World {
    pub users: Arc<InMemoryUserRepository>,
    pub documents: Arc<InMemoryDocumentRepository>,
    pub cache: Arc<InMemorySessionCache>,
    pub store: Arc<InMemoryObjectStore>,
    pub clock: Arc<FixtureClock>,
    state: web::Data<HttpState>,
}

/// Status, trace header and JSON body of one call.
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub body: Value,
}

impl World {
    pub fn new() -> Self {
        Self::with_failure_status(AuthFailureStatus::Legacy)
    }

    pub fn with_failure_status(failure_status: AuthFailureStatus) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let documents = Arc::new(InMemoryDocumentRepository::default());
        let cache = Arc::new(InMemorySessionCache::default());
        let store = Arc::new(InMemoryObjectStore::default());
        let clock = Arc::new(FixtureClock::default());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let tokens = Arc::new(
            JwtTokenService::new(SECRET, TOKEN_VALIDITY, dyn_clock.clone())
                .expect("token service"),
        );
        let accounts = Arc::new(AccountServiceImpl::new(
            users.clone(),
            Arc::new(PlaintextPasswordHasher),
            tokens.clone(),
            cache.clone(),
            dyn_clock.clone(),
        ));
        let sessions = Arc::new(
            CachedSessionResolver::new(users.clone(), cache.clone(), tokens)
                .with_failure_status(failure_status),
        );
        let document_service = Arc::new(DocumentServiceImpl::new(
            documents.clone(),
            store.clone(),
            dyn_clock,
            DocumentSettings {
                max_upload_bytes: UPLOAD_LIMIT,
                ..DocumentSettings::default()
            },
        ));
        let state = web::Data::new(
            HttpState::new(accounts, sessions, document_service).with_upload_limit(UPLOAD_LIMIT),
        );

        Self {
            users,
            documents,
            cache,
            store,
            clock,
            state,
        }
    }

    /// Send `request` through the full middleware stack.
    pub async fn call(&self, request: test::TestRequest) -> Reply {
        let app = test::init_service(
            App::new()
                .app_data(self.state.clone())
                .app_data(json_config())
                .wrap(Trace)
                .service(api_scope()),
        )
        .await;
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = test::read_body_json(response).await;
        Reply {
            status,
            trace_id,
            body,
        }
    }

    /// Register `email` and return the issued bearer header value.
    pub async fn register(&self, email: &str) -> String {
        let reply = self
            .call(test::TestRequest::post().uri("/v1/auth/register").set_json(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": "correct horse",
            })))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "register: {}", reply.body);
        bearer(&reply.body)
    }
}

/// `Bearer <token>` built from a login or register body.
pub fn bearer(body: &Value) -> String {
    let token = body["data"]["token"].as_str().expect("token in body");
    format!("Bearer {token}")
}

pub fn authorised(request: test::TestRequest, token: &str) -> test::TestRequest {
    request.insert_header((AUTHORIZATION, token.to_owned()))
}

/// Multipart upload with a `file` part and an optional `name` part.
pub fn upload(
    token: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
    name: Option<&str>,
) -> test::TestRequest {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    if let Some(name) = name {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    authorised(test::TestRequest::post().uri("/v1/documents"), token)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}
