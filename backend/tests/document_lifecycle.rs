//! End-to-end document behaviour: upload, listing, ownership, rename and
//! delete over the HTTP surface.

#[path = "support/app.rs"]
mod app;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use app::{UPLOAD_LIMIT, World, authorised, upload};
use docvault::domain::DocumentId;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn world() -> World {
    World::new()
}

async fn create(world: &World, token: &str, filename: &str, name: Option<&str>) -> Value {
    let reply = world
        .call(upload(token, filename, "text/plain", b"hello", name))
        .await;
    assert_eq!(reply.status, StatusCode::OK, "create: {}", reply.body);
    reply.body["data"].clone()
}

fn document_uri(document: &Value) -> String {
    let id = document["documentId"].as_str().expect("document id");
    format!("/v1/documents/{id}")
}

#[rstest]
#[actix_web::test]
async fn created_documents_round_trip_through_get(world: World) {
    let token = world.register("ada@example.com").await;

    let created = create(&world, &token, "my notes.txt", Some("Notes")).await;
    assert_eq!(created["name"], "Notes");
    assert_eq!(created["originalName"], "my notes.txt");
    assert_eq!(created["fileSize"], 5);
    assert_eq!(created["mimeType"], "text/plain");
    let key = created["filePath"].as_str().expect("file path");
    let user_id = created["userId"].as_str().expect("user id");
    assert!(key.starts_with(&format!("documents/{user_id}-")));
    assert!(key.ends_with("-my-notes.txt"));
    assert_eq!(
        world.store.object(key),
        Some((b"hello".to_vec(), "text/plain".to_owned()))
    );

    let fetched = world
        .call(authorised(TestRequest::get().uri(&document_uri(&created)), &token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["message"], "Document details fetched successfully");
    assert_eq!(fetched.body["data"]["documentId"], created["documentId"]);
    assert_eq!(fetched.body["data"]["name"], "Notes");
    assert!(
        fetched.body["data"]["signedFilePath"]
            .as_str()
            .is_some_and(|url| url.contains(key))
    );
}

#[rstest]
#[actix_web::test]
async fn blank_names_fall_back_to_the_file_name(world: World) {
    let token = world.register("ada@example.com").await;

    let created = create(&world, &token, "report.txt", Some("   ")).await;

    assert_eq!(created["name"], "report.txt");
}

#[rstest]
#[actix_web::test]
async fn listing_returns_only_the_callers_documents_newest_first(world: World) {
    let ada = world.register("ada@example.com").await;
    let grace = world.register("grace@example.com").await;

    create(&world, &ada, "first.txt", None).await;
    world.clock.advance(std::time::Duration::from_secs(5));
    create(&world, &ada, "second.txt", None).await;
    create(&world, &grace, "other.txt", None).await;

    let reply = world
        .call(authorised(TestRequest::get().uri("/v1/documents"), &ada))
        .await;

    assert_eq!(reply.status, StatusCode::OK);
    let names: Vec<&str> = reply.body["data"]
        .as_array()
        .expect("document list")
        .iter()
        .filter_map(|document| document["name"].as_str())
        .collect();
    assert_eq!(names, ["second.txt", "first.txt"]);
}

#[rstest]
#[actix_web::test]
async fn disallowed_mime_types_are_rejected(world: World) {
    let token = world.register("ada@example.com").await;

    let reply = world
        .call(upload(&token, "paper.pdf", "application/pdf", b"%PDF-1.7", None))
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body["message"],
        "File Type: application/pdf Not Allowed For"
    );
    assert_eq!(reply.body["allowedFileTypes"], json!(["text/plain"]));
    assert!(world.store.is_empty());
}

#[rstest]
#[actix_web::test]
async fn oversize_uploads_are_rejected(world: World) {
    let token = world.register("ada@example.com").await;
    let bytes = vec![b'a'; UPLOAD_LIMIT + 10];

    let reply = world
        .call(upload(&token, "big.txt", "text/plain", &bytes, None))
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "File exceeds the maximum upload size");
    assert_eq!(reply.body["maxFileSize"], UPLOAD_LIMIT);
    assert!(world.store.is_empty());
}

#[rstest]
#[actix_web::test]
async fn empty_files_count_as_missing(world: World) {
    let token = world.register("ada@example.com").await;

    let reply = world
        .call(upload(&token, "empty.txt", "text/plain", b"", None))
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Required fields are missing");
    assert_eq!(reply.body["requiredFields"], json!(["file"]));
}

#[rstest]
#[actix_web::test]
async fn json_bodies_count_as_a_missing_file(world: World) {
    let token = world.register("ada@example.com").await;

    let reply = world
        .call(authorised(
            TestRequest::post().uri("/v1/documents").set_json(json!({})),
            &token,
        ))
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Required fields are missing");
    assert_eq!(reply.body["requiredFields"], json!(["file"]));
    assert!(world.store.is_empty());
}

#[rstest]
#[case(TestRequest::get(), "access")]
#[case(TestRequest::patch().set_json(json!({"name": "mine now"})), "update")]
#[case(TestRequest::delete(), "delete")]
#[actix_web::test]
async fn other_users_documents_are_forbidden(
    world: World,
    #[case] request: TestRequest,
    #[case] action: &str,
) {
    let ada = world.register("ada@example.com").await;
    let grace = world.register("grace@example.com").await;
    let created = create(&world, &ada, "private.txt", None).await;

    let reply = world
        .call(authorised(request.uri(&document_uri(&created)), &grace))
        .await;

    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(
        reply.body["message"],
        format!("You do not have permission to {action} this document")
    );
    assert_eq!(world.documents.writes(), 0);
}

#[rstest]
#[actix_web::test]
async fn unknown_documents_are_not_found(world: World) {
    let token = world.register("ada@example.com").await;
    let missing = DocumentId::random();

    let reply = world
        .call(authorised(
            TestRequest::get().uri(&format!("/v1/documents/{missing}")),
            &token,
        ))
        .await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "Document not found");
}

#[rstest]
#[actix_web::test]
async fn rename_updates_the_stored_row(world: World) {
    let token = world.register("ada@example.com").await;
    let created = create(&world, &token, "draft.txt", None).await;
    world.clock.advance(std::time::Duration::from_secs(60));

    let reply = world
        .call(
            authorised(TestRequest::put().uri(&document_uri(&created)), &token)
                .set_json(json!({"name": "final.txt"})),
        )
        .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "Document updated successfully");
    assert_eq!(reply.body["data"]["name"], "final.txt");
    assert_ne!(reply.body["data"]["updatedAt"], created["updatedAt"]);
    assert_eq!(reply.body["data"]["createdAt"], created["createdAt"]);
}

#[rstest]
#[case(json!({}), "No data provided for update", None)]
#[case(json!({"name": null}), "No data provided for update", None)]
#[case(json!({"owner": "me"}), "Invalid fields in update data", Some(json!(["name"])))]
#[actix_web::test]
async fn invalid_updates_issue_no_write(
    world: World,
    #[case] payload: Value,
    #[case] message: &str,
    #[case] allowed_fields: Option<Value>,
) {
    let token = world.register("ada@example.com").await;
    let created = create(&world, &token, "draft.txt", None).await;

    let reply = world
        .call(
            authorised(TestRequest::patch().uri(&document_uri(&created)), &token)
                .set_json(payload),
        )
        .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], message);
    if let Some(allowed) = allowed_fields {
        assert_eq!(reply.body["allowedFields"], allowed);
    }
    assert_eq!(world.documents.writes(), 0);
}

#[rstest]
#[actix_web::test]
async fn delete_removes_the_row_and_the_blob(world: World) {
    let token = world.register("ada@example.com").await;
    let created = create(&world, &token, "gone.txt", None).await;
    let id = DocumentId::new(created["documentId"].as_str().expect("document id"))
        .expect("valid document id");

    let reply = world
        .call(authorised(TestRequest::delete().uri(&document_uri(&created)), &token))
        .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({"status": "success", "message": "Document deleted successfully"})
    );
    assert!(world.documents.get(&id).is_none());
    assert!(world.store.is_empty());

    let again = world
        .call(authorised(TestRequest::get().uri(&document_uri(&created)), &token))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn document_routes_require_a_session(world: World) {
    let reply = world.call(TestRequest::get().uri("/v1/documents")).await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body["message"], "Authorization header missing");
    assert!(reply.trace_id.is_some());
}
