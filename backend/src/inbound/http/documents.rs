//! Document API handlers.
//!
//! ```text
//! POST         /v1/documents                 multipart: file, name?
//! GET          /v1/documents
//! GET          /v1/documents/{documentId}
//! PATCH | PUT  /v1/documents/{documentId}    {"name":"notes.txt"}
//! DELETE       /v1/documents/{documentId}
//! ```

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, delete, get, post, route, web};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt as _;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ApiResult;
use super::envelope::{ErrorBodySchema, SuccessEnvelope, ok};
use super::session::Authenticated;
use super::state::HttpState;
use crate::domain::ports::{CreateDocumentRequest, DocumentView, UploadedFile};
use crate::domain::{DocumentId, Error};

pub const CREATED_MESSAGE: &str = "Document created successfully";
pub const LISTED_MESSAGE: &str = "Documents fetched successfully";
pub const FETCHED_MESSAGE: &str = "Document details fetched successfully";
pub const UPDATED_MESSAGE: &str = "Document updated successfully";
pub const DELETED_MESSAGE: &str = "Document deleted successfully";

const FILE_PART: &str = "file";
const NAME_PART: &str = "name";
const NAME_PART_LIMIT: usize = 4 * 1024;
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Document metadata with a signed read URL.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    pub document_id: Uuid,
    #[schema(example = "notes.txt")]
    pub name: String,
    pub original_name: String,
    pub user_id: Uuid,
    #[schema(example = "documents/3fa85f64-5717-4562-b3fc-2c963f66afa6-1714564800000-notes.txt")]
    pub file_path: String,
    pub file_size: u64,
    #[schema(example = "text/plain")]
    pub mime_type: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
    pub signed_file_path: Option<String>,
}

impl From<DocumentView> for DocumentBody {
    fn from(view: DocumentView) -> Self {
        let DocumentView {
            document,
            signed_url,
        } = view;
        Self {
            document_id: *document.id.as_uuid(),
            name: document.name.as_str().to_owned(),
            original_name: document.original_name,
            user_id: *document.owner.as_uuid(),
            file_path: document.storage_key.as_str().to_owned(),
            file_size: document.file_size,
            mime_type: document.mime_type,
            created_at: document.created_at,
            updated_at: document.updated_at,
            signed_file_path: signed_url,
        }
    }
}

/// Multipart body accepted by `POST /v1/documents`.
#[derive(ToSchema)]
#[allow(dead_code, reason = "documentation-only schema")]
pub struct CreateDocumentForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    name: Option<String>,
}

fn parse_document_id(raw: &str) -> Result<DocumentId, Error> {
    DocumentId::new(raw).map_err(|_| Error::invalid_request("Invalid document id"))
}

fn map_multipart_error(err: MultipartError) -> Error {
    debug!(error = %err, "rejected multipart payload");
    Error::invalid_request("Invalid multipart form data")
}

/// True when the body is not a multipart form at all, as opposed to a
/// malformed one.
fn is_not_multipart(err: &MultipartError) -> bool {
    matches!(
        err,
        MultipartError::ContentTypeMissing | MultipartError::ContentTypeIncompatible
    )
}

/// Buffer a field, reading at most `limit` bytes.
async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        let room = limit.saturating_sub(bytes.len());
        bytes.extend_from_slice(&chunk.slice(..chunk.len().min(room)));
        if bytes.len() >= limit {
            break;
        }
    }
    Ok(bytes)
}

/// Collect the `file` and `name` parts.
///
/// The file part is cut off one byte past `upload_limit` so oversize uploads
/// are rejected without buffering the whole payload. A body that is not
/// multipart at all yields no parts, so the service reports the missing file.
async fn read_form(
    mut form: Multipart,
    upload_limit: usize,
) -> Result<(Option<String>, Option<UploadedFile>), Error> {
    let mut name = None;
    let mut file = None;
    loop {
        let next = match form.try_next().await {
            Ok(next) => next,
            Err(err) if is_not_multipart(&err) => {
                debug!(error = %err, "create request carried no multipart form");
                return Ok((None, None));
            }
            Err(err) => return Err(map_multipart_error(err)),
        };
        let Some(mut field) = next else {
            break;
        };
        let part = field.name().map(str::to_owned);
        match part.as_deref() {
            Some(FILE_PART) if file.is_none() => {
                let original_name = field
                    .content_disposition()
                    .and_then(|disposition| disposition.get_filename())
                    .unwrap_or_default()
                    .to_owned();
                let mime_type = field
                    .content_type()
                    .map_or_else(|| DEFAULT_MIME_TYPE.to_owned(), |mime| {
                        mime.essence_str().to_owned()
                    });
                let bytes = read_field(&mut field, upload_limit.saturating_add(1)).await?;
                let oversize = bytes.len() > upload_limit;
                file = Some(UploadedFile {
                    original_name,
                    mime_type,
                    bytes,
                });
                if oversize {
                    break;
                }
            }
            Some(NAME_PART) => {
                let raw = read_field(&mut field, NAME_PART_LIMIT).await?;
                let text = String::from_utf8(raw)
                    .map_err(|_| Error::invalid_request("Document name must be valid UTF-8"))?;
                name = Some(text);
            }
            _ => {
                while field.try_next().await.map_err(map_multipart_error)?.is_some() {}
            }
        }
    }
    Ok((name, file))
}

/// Upload a text file and record it for the caller.
#[utoipa::path(
    post,
    path = "/v1/documents",
    request_body(content = CreateDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document created", body = DocumentBody),
        (status = 400, description = "Missing file, disallowed type or oversize", body = ErrorBodySchema),
        (status = 500, description = "Upload or insert failed", body = ErrorBodySchema)
    ),
    tags = ["documents"],
    operation_id = "createDocument",
    security(("bearerAuth" = []))
)]
#[post("/documents")]
pub async fn create_document(
    state: web::Data<HttpState>,
    user: Authenticated,
    form: Multipart,
) -> ApiResult<HttpResponse> {
    let (name, file) = read_form(form, state.upload_limit).await?;
    let view = state
        .documents
        .create(CreateDocumentRequest {
            owner: *user.user_id(),
            name,
            file,
        })
        .await?;
    Ok(ok(CREATED_MESSAGE, DocumentBody::from(view)))
}

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/v1/documents",
    responses(
        (status = 200, description = "Documents", body = [DocumentBody]),
        (status = 500, description = "Internal server error", body = ErrorBodySchema)
    ),
    tags = ["documents"],
    operation_id = "listDocuments",
    security(("bearerAuth" = []))
)]
#[get("/documents")]
pub async fn list_documents(
    state: web::Data<HttpState>,
    user: Authenticated,
) -> ApiResult<HttpResponse> {
    let views = state.documents.list(user.user_id()).await?;
    let body: Vec<DocumentBody> = views.into_iter().map(DocumentBody::from).collect();
    Ok(ok(LISTED_MESSAGE, body))
}

/// Fetch one of the caller's documents.
#[utoipa::path(
    get,
    path = "/v1/documents/{documentId}",
    params(("documentId" = Uuid, Path, description = "Document identifier")),
    responses(
        (status = 200, description = "Document", body = DocumentBody),
        (status = 403, description = "Owned by another user", body = ErrorBodySchema),
        (status = 404, description = "Not found", body = ErrorBodySchema)
    ),
    tags = ["documents"],
    operation_id = "getDocument",
    security(("bearerAuth" = []))
)]
#[get("/documents/{document_id}")]
pub async fn get_document(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(&path)?;
    let view = state.documents.get(user.user_id(), &id).await?;
    Ok(ok(FETCHED_MESSAGE, DocumentBody::from(view)))
}

/// Rename one of the caller's documents.
#[utoipa::path(
    method(patch, put),
    path = "/v1/documents/{documentId}",
    params(("documentId" = Uuid, Path, description = "Document identifier")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated document", body = DocumentBody),
        (status = 400, description = "Empty or invalid update", body = ErrorBodySchema),
        (status = 403, description = "Owned by another user", body = ErrorBodySchema),
        (status = 404, description = "Not found", body = ErrorBodySchema)
    ),
    tags = ["documents"],
    operation_id = "updateDocument",
    security(("bearerAuth" = []))
)]
#[route("/documents/{document_id}", method = "PATCH", method = "PUT")]
pub async fn update_document(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(&path)?;
    let view = state
        .documents
        .update(user.user_id(), &id, payload.into_inner())
        .await?;
    Ok(ok(UPDATED_MESSAGE, DocumentBody::from(view)))
}

/// Delete one of the caller's documents and its stored file.
#[utoipa::path(
    delete,
    path = "/v1/documents/{documentId}",
    params(("documentId" = Uuid, Path, description = "Document identifier")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 403, description = "Owned by another user", body = ErrorBodySchema),
        (status = 404, description = "Not found", body = ErrorBodySchema),
        (status = 500, description = "Nothing was deleted", body = ErrorBodySchema)
    ),
    tags = ["documents"],
    operation_id = "deleteDocument",
    security(("bearerAuth" = []))
)]
#[delete("/documents/{document_id}")]
pub async fn delete_document(
    state: web::Data<HttpState>,
    user: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_document_id(&path)?;
    state.documents.delete(user.user_id(), &id).await?;
    Ok(SuccessEnvelope::message_only(DELETED_MESSAGE).into_response())
}

#[cfg(test)]
mod tests;
