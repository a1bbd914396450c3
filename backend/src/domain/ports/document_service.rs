//! Driving port for ownership-checked document operations.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Document, DocumentId, Error, UserId};

/// File part received with a create request.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("original_name", &self.original_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Input for [`DocumentService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDocumentRequest {
    pub owner: UserId,
    /// Display name; blank or absent falls back to the file name.
    pub name: Option<String>,
    pub file: Option<UploadedFile>,
}

/// A document together with a freshly signed read URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub document: Document,
    pub signed_url: Option<String>,
}

/// Document use-cases. Every operation acts on behalf of `owner`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload a file and record its metadata.
    async fn create(&self, request: CreateDocumentRequest) -> Result<DocumentView, Error>;

    /// List the owner's documents, newest first.
    async fn list(&self, owner: &UserId) -> Result<Vec<DocumentView>, Error>;

    /// Fetch one document the owner holds.
    async fn get(&self, owner: &UserId, id: &DocumentId) -> Result<DocumentView, Error>;

    /// Apply a partial update from a raw JSON object.
    async fn update(
        &self,
        owner: &UserId,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<DocumentView, Error>;

    /// Delete a document and its blob.
    async fn delete(&self, owner: &UserId, id: &DocumentId) -> Result<(), Error>;
}
