//! Port abstraction for the document metadata store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Document, DocumentChanges, DocumentId, NewDocument, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by document repository adapters.
    pub enum DocumentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "document repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document repository query failed: {message}",
    }
}

/// Document metadata store.
///
/// Mutations take the owner alongside the document id and must only touch
/// rows matching both.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a document row.
    async fn create(
        &self,
        document: &NewDocument,
    ) -> Result<Option<Document>, DocumentPersistenceError>;

    /// Fetch a document by id regardless of owner.
    async fn find_by_id(
        &self,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocumentPersistenceError>;

    /// List an owner's documents, newest first.
    async fn find_by_owner(&self, owner: &UserId)
    -> Result<Vec<Document>, DocumentPersistenceError>;

    /// Apply a partial update. Returns `Ok(None)` without writing when
    /// `changes` is empty, and when no row matches `id` and `owner`.
    async fn update(
        &self,
        id: &DocumentId,
        owner: &UserId,
        changes: &DocumentChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentPersistenceError>;

    /// Delete the row matching `id` and `owner`; true when a row was removed.
    async fn delete(&self, id: &DocumentId, owner: &UserId)
    -> Result<bool, DocumentPersistenceError>;
}
