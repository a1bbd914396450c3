//! Tests for document API handlers.

use super::*;
use crate::domain::ports::{MockAccountService, MockDocumentService};
use crate::domain::{Document, DocumentName, StorageKey};
use crate::inbound::http::test_utils::{
    FIXTURE_USER_ID, GOOD_TOKEN, fixture_time, fixture_user_id, state_with,
};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::json;

const DOCUMENT_ID: &str = "9b2f4c1e-6d3a-4f5b-8c7d-0e1f2a3b4c5d";
const BOUNDARY: &str = "docvault-test-boundary";

fn document_id() -> DocumentId {
    DocumentId::new(DOCUMENT_ID).expect("fixture id")
}

fn view() -> DocumentView {
    DocumentView {
        document: Document {
            id: document_id(),
            name: DocumentName::new("notes").expect("valid name"),
            original_name: "notes.txt".into(),
            owner: fixture_user_id(),
            storage_key: StorageKey::from_stored("documents/key-notes.txt"),
            file_size: 5,
            mime_type: "text/plain".into(),
            created_at: fixture_time(),
            updated_at: fixture_time(),
        },
        signed_url: Some("https://bucket.example/documents/key-notes.txt?X-Amz-Signature=abc".into()),
    }
}

enum Part<'a> {
    File {
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/v1/documents")
        .insert_header((AUTHORIZATION, GOOD_TOKEN))
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart(parts))
}

async fn send_with_limit(
    documents: MockDocumentService,
    upload_limit: usize,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let state = state_with(MockAccountService::new(), documents);
    let state = web::Data::new(state.get_ref().clone().with_upload_limit(upload_limit));
    let app = actix_test::init_service(
        App::new().app_data(state).service(
            web::scope("/v1")
                .service(create_document)
                .service(list_documents)
                .service(get_document)
                .service(update_document)
                .service(delete_document),
        ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    (status, actix_test::read_body_json(response).await)
}

async fn send(documents: MockDocumentService, request: actix_test::TestRequest) -> (StatusCode, Value) {
    send_with_limit(documents, 1024, request).await
}

#[actix_web::test]
async fn create_forwards_the_file_and_name() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_create()
        .withf(|request| {
            let Some(file) = request.file.as_ref() else {
                return false;
            };
            request.owner == fixture_user_id()
                && request.name.as_deref() == Some("notes")
                && file.original_name == "my notes.txt"
                && file.mime_type == "text/plain"
                && file.bytes == b"hello"
        })
        .times(1)
        .returning(|_| Ok(view()));

    let (status, body) = send(
        documents,
        upload_request(&[
            Part::File {
                filename: "my notes.txt",
                content_type: "text/plain; charset=utf-8",
                bytes: b"hello",
            },
            Part::Text {
                name: "name",
                value: "notes",
            },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], CREATED_MESSAGE);
    assert_eq!(body["data"]["documentId"], DOCUMENT_ID);
    assert_eq!(body["data"]["userId"], FIXTURE_USER_ID);
    assert_eq!(body["data"]["fileSize"], 5);
    assert_eq!(body["data"]["mimeType"], "text/plain");
    assert!(body["data"]["signedFilePath"].is_string());
}

#[actix_web::test]
async fn create_without_a_file_part_reaches_the_service_empty() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_create()
        .withf(|request| request.file.is_none())
        .times(1)
        .returning(|_| {
            Err(Error::invalid_request("Required fields are missing")
                .with_detail("requiredFields", json!(["file"])))
        });

    let (status, body) = send(
        documents,
        upload_request(&[Part::Text {
            name: "name",
            value: "notes",
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["requiredFields"], json!(["file"]));
}

#[actix_web::test]
async fn oversize_files_are_cut_off_one_byte_past_the_limit() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_create()
        .withf(|request| request.file.as_ref().is_some_and(|file| file.bytes.len() == 5))
        .times(1)
        .returning(|_| Err(Error::invalid_request("File exceeds the maximum upload size")));

    let (status, _) = send_with_limit(
        documents,
        4,
        upload_request(&[Part::File {
            filename: "big.txt",
            content_type: "text/plain",
            bytes: b"0123456789",
        }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[case(Some("application/json"), r#"{}"#)]
#[case(None, "")]
#[actix_web::test]
async fn non_multipart_bodies_reach_the_service_without_a_file(
    #[case] content_type: Option<&'static str>,
    #[case] payload: &'static str,
) {
    let mut documents = MockDocumentService::new();
    documents
        .expect_create()
        .withf(|request| request.file.is_none() && request.name.is_none())
        .times(1)
        .returning(|_| {
            Err(Error::invalid_request("Required fields are missing")
                .with_detail("requiredFields", json!(["file"])))
        });

    let mut request = actix_test::TestRequest::post()
        .uri("/v1/documents")
        .insert_header((AUTHORIZATION, GOOD_TOKEN))
        .set_payload(payload);
    if let Some(value) = content_type {
        request = request.insert_header((CONTENT_TYPE, value));
    }
    let (status, body) = send(documents, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Required fields are missing");
    assert_eq!(body["requiredFields"], json!(["file"]));
}

#[actix_web::test]
async fn create_requires_authentication() {
    let mut documents = MockDocumentService::new();
    documents.expect_create().times(0);

    let request = actix_test::TestRequest::post()
        .uri("/v1/documents")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart(&[]));
    let (status, body) = send(documents, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Authorization header missing");
}

#[actix_web::test]
async fn list_wraps_every_document() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_list()
        .withf(|owner| *owner == fixture_user_id())
        .times(1)
        .returning(|_| Ok(vec![view(), view()]));

    let (status, body) = send(
        documents,
        actix_test::TestRequest::get()
            .uri("/v1/documents")
            .insert_header((AUTHORIZATION, GOOD_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], LISTED_MESSAGE);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn get_returns_document_details() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_get()
        .withf(|owner, id| *owner == fixture_user_id() && *id == document_id())
        .times(1)
        .returning(|_, _| Ok(view()));

    let (status, body) = send(
        documents,
        actix_test::TestRequest::get()
            .uri(&format!("/v1/documents/{DOCUMENT_ID}"))
            .insert_header((AUTHORIZATION, GOOD_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], FETCHED_MESSAGE);
    assert_eq!(body["data"]["name"], "notes");
    assert_eq!(body["data"]["originalName"], "notes.txt");
    assert_eq!(body["data"]["filePath"], "documents/key-notes.txt");
}

#[rstest]
#[case(actix_test::TestRequest::get())]
#[case(actix_test::TestRequest::delete())]
#[actix_web::test]
async fn malformed_ids_are_rejected_before_the_service(#[case] request: actix_test::TestRequest) {
    let mut documents = MockDocumentService::new();
    documents.expect_get().times(0);
    documents.expect_delete().times(0);

    let (status, body) = send(
        documents,
        request
            .uri("/v1/documents/not-a-uuid")
            .insert_header((AUTHORIZATION, GOOD_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid document id");
}

#[actix_web::test]
async fn ownership_failures_pass_through() {
    let mut documents = MockDocumentService::new();
    documents.expect_get().times(1).returning(|_, _| {
        Err(Error::forbidden(
            "You do not have permission to access this document",
        ))
    });

    let (status, body) = send(
        documents,
        actix_test::TestRequest::get()
            .uri(&format!("/v1/documents/{DOCUMENT_ID}"))
            .insert_header((AUTHORIZATION, GOOD_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[case(actix_test::TestRequest::patch())]
#[case(actix_test::TestRequest::put())]
#[actix_web::test]
async fn update_accepts_patch_and_put(#[case] request: actix_test::TestRequest) {
    let mut documents = MockDocumentService::new();
    documents
        .expect_update()
        .withf(|_, id, fields| *id == document_id() && fields.get("name") == Some(&json!("renamed")))
        .times(1)
        .returning(|_, _, _| Ok(view()));

    let (status, body) = send(
        documents,
        request
            .uri(&format!("/v1/documents/{DOCUMENT_ID}"))
            .insert_header((AUTHORIZATION, GOOD_TOKEN))
            .set_json(json!({"name": "renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], UPDATED_MESSAGE);
}

#[actix_web::test]
async fn delete_answers_without_data() {
    let mut documents = MockDocumentService::new();
    documents
        .expect_delete()
        .withf(|owner, id| *owner == fixture_user_id() && *id == document_id())
        .times(1)
        .returning(|_, _| Ok(()));

    let (status, body) = send(
        documents,
        actix_test::TestRequest::delete()
            .uri(&format!("/v1/documents/{DOCUMENT_ID}"))
            .insert_header((AUTHORIZATION, GOOD_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "message": DELETED_MESSAGE}));
}
