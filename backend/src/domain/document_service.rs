//! Ownership-checked document use-cases.
//!
//! Reads and writes go through the same gate: load the row, answer 404 when
//! it is absent and 403 when it belongs to someone else. Mutations then
//! repeat the owner filter in the statement itself, so a document that
//! changes hands or disappears between the check and the write is reported
//! as missing instead of being touched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};

use super::{
    ALLOWED_MIME_TYPES, Document, DocumentChanges, DocumentField, DocumentId, DocumentName, Error,
    NewDocument, StorageKey, UserId, is_allowed_mime_type,
};
use crate::domain::ports::{
    CreateDocumentRequest, DocumentPersistenceError, DocumentRepository, DocumentService,
    DocumentView, ObjectStore, UploadedFile,
};

pub const MISSING_FIELDS_MESSAGE: &str = "Required fields are missing";
pub const DOCUMENT_NOT_FOUND_MESSAGE: &str = "Document not found";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create document";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete document";
pub const FILE_TOO_LARGE_MESSAGE: &str = "File exceeds the maximum upload size";

/// Tunables for [`DocumentServiceImpl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Prefix for derived storage keys.
    pub key_prefix: String,
    /// Lifetime of signed read URLs.
    pub signed_url_expiry: Duration,
    /// Upper bound on upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            key_prefix: "documents".to_owned(),
            signed_url_expiry: Duration::from_secs(900),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Access,
    Update,
    Delete,
}

impl Action {
    fn forbidden(self) -> Error {
        let verb = match self {
            Self::Access => "access",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        Error::forbidden(format!("You do not have permission to {verb} this document"))
    }
}

fn map_repository_error(error: DocumentPersistenceError) -> Error {
    match error {
        DocumentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("document repository unavailable: {message}"))
        }
        DocumentPersistenceError::Query { message } => {
            Error::internal(format!("document repository error: {message}"))
        }
    }
}

fn missing_file() -> Error {
    Error::invalid_request(MISSING_FIELDS_MESSAGE).with_detail("requiredFields", json!(["file"]))
}

/// [`DocumentService`] over a metadata repository and an object store.
pub struct DocumentServiceImpl<R: ?Sized, S: ?Sized> {
    documents: Arc<R>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    settings: DocumentSettings,
}

impl<R: ?Sized, S: ?Sized> DocumentServiceImpl<R, S> {
    pub fn new(
        documents: Arc<R>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        settings: DocumentSettings,
    ) -> Self {
        Self {
            documents,
            store,
            clock,
            settings,
        }
    }
}

impl<R, S> DocumentServiceImpl<R, S>
where
    R: DocumentRepository + ?Sized,
    S: ObjectStore + ?Sized,
{
    fn validate_upload(&self, file: Option<UploadedFile>) -> Result<UploadedFile, Error> {
        let file = file
            .filter(|file| !file.bytes.is_empty() && !file.original_name.trim().is_empty())
            .ok_or_else(missing_file)?;
        if file.bytes.len() > self.settings.max_upload_bytes {
            return Err(Error::invalid_request(FILE_TOO_LARGE_MESSAGE)
                .with_detail("maxFileSize", json!(self.settings.max_upload_bytes)));
        }
        if !is_allowed_mime_type(&file.mime_type) {
            return Err(Error::invalid_request(format!(
                "File Type: {} Not Allowed For",
                file.mime_type
            ))
            .with_detail("allowedFileTypes", json!(ALLOWED_MIME_TYPES)));
        }
        Ok(file)
    }

    async fn view(&self, document: Document) -> Result<DocumentView, Error> {
        let signed_url = self
            .store
            .signed_url(&document.storage_key, Some(self.settings.signed_url_expiry))
            .await
            .map_err(|err| Error::internal(format!("signing document url failed: {err}")))?;
        Ok(DocumentView {
            document,
            signed_url,
        })
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: &DocumentId,
        action: Action,
    ) -> Result<Document, Error> {
        let document = self
            .documents
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(DOCUMENT_NOT_FOUND_MESSAGE))?;
        if !document.is_owned_by(owner) {
            warn!(document_id = %id, user_id = %owner, ?action, "ownership check failed");
            return Err(action.forbidden());
        }
        Ok(document)
    }

    async fn discard_blob(&self, key: &StorageKey) {
        if let Err(err) = self.store.delete(key).await {
            warn!(
                error = %err,
                kind = err.kind(),
                storage_key = %key,
                "failed to remove document blob"
            );
        }
    }
}

#[async_trait]
impl<R, S> DocumentService for DocumentServiceImpl<R, S>
where
    R: DocumentRepository + ?Sized,
    S: ObjectStore + ?Sized,
{
    async fn create(&self, request: CreateDocumentRequest) -> Result<DocumentView, Error> {
        let CreateDocumentRequest { owner, name, file } = request;
        let file = self.validate_upload(file)?;

        let display_name = name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| file.original_name.clone());
        let name = DocumentName::new(display_name)
            .map_err(|err| Error::invalid_request(format!("Invalid document name: {err}")))?;

        let now = self.clock.utc();
        let storage_key =
            StorageKey::derive(&self.settings.key_prefix, &owner, now, &file.original_name);
        let file_size = u64::try_from(file.bytes.len())
            .map_err(|_| Error::internal("upload size does not fit in u64"))?;
        let UploadedFile {
            original_name,
            mime_type,
            bytes,
        } = file;

        self.store
            .upload(&storage_key, bytes, &mime_type)
            .await
            .map_err(|err| {
                error!(
                    error = %err,
                    kind = err.kind(),
                    storage_key = %storage_key,
                    "document upload failed"
                );
                Error::dependency_failed(UPLOAD_FAILED_MESSAGE)
            })?;

        let new_document = NewDocument {
            id: DocumentId::random(),
            name,
            original_name,
            owner,
            storage_key: storage_key.clone(),
            file_size,
            mime_type,
            created_at: now,
        };
        let created = match self.documents.create(&new_document).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                error!(document_id = %new_document.id, "document insert returned no row");
                self.discard_blob(&storage_key).await;
                return Err(Error::dependency_failed(CREATE_FAILED_MESSAGE));
            }
            Err(err) => {
                self.discard_blob(&storage_key).await;
                return Err(map_repository_error(err));
            }
        };

        info!(document_id = %created.id, user_id = %created.owner, "document created");
        self.view(created).await
    }

    async fn list(&self, owner: &UserId) -> Result<Vec<DocumentView>, Error> {
        let documents = self
            .documents
            .find_by_owner(owner)
            .await
            .map_err(map_repository_error)?;
        let mut views = Vec::with_capacity(documents.len());
        for document in documents {
            views.push(self.view(document).await?);
        }
        Ok(views)
    }

    async fn get(&self, owner: &UserId, id: &DocumentId) -> Result<DocumentView, Error> {
        let document = self.find_owned(owner, id, Action::Access).await?;
        self.view(document).await
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<DocumentView, Error> {
        let changes = DocumentChanges::from_fields(&fields).map_err(|err| {
            err.into_error(DocumentField::updatable().map(DocumentField::api_name))
        })?;
        self.find_owned(owner, id, Action::Update).await?;

        let updated = self
            .documents
            .update(id, owner, &changes, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(DOCUMENT_NOT_FOUND_MESSAGE))?;
        self.view(updated).await
    }

    async fn delete(&self, owner: &UserId, id: &DocumentId) -> Result<(), Error> {
        let document = self.find_owned(owner, id, Action::Delete).await?;
        let removed = self
            .documents
            .delete(id, owner)
            .await
            .map_err(map_repository_error)?;
        if !removed {
            error!(document_id = %id, "document delete affected no rows");
            return Err(Error::dependency_failed(DELETE_FAILED_MESSAGE));
        }
        self.discard_blob(&document.storage_key).await;
        info!(document_id = %id, user_id = %owner, "document deleted");
        Ok(())
    }
}
