//! PostgreSQL-backed `DocumentRepository` implementation using Diesel ORM.
//!
//! Mutations carry the owner in their `WHERE` clause alongside the document
//! id, so a row that changed hands after the service's ownership check is
//! left alone and reported as absent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{DocumentPersistenceError, DocumentRepository};
use crate::domain::{
    Document, DocumentChanges, DocumentId, DocumentName, NewDocument, StorageKey, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DocumentRow, DocumentUpdate, NewDocumentRow};
use super::pool::{DbPool, PoolError};
use super::schema::documents;

/// Diesel-backed implementation of the `DocumentRepository` port.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DocumentPersistenceError {
    map_basic_pool_error(error, DocumentPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DocumentPersistenceError {
    map_basic_diesel_error(
        error,
        DocumentPersistenceError::query,
        DocumentPersistenceError::connection,
    )
}

fn file_size_for_db(size: u64) -> Result<i64, DocumentPersistenceError> {
    i64::try_from(size).map_err(|_| DocumentPersistenceError::query("file size out of range"))
}

fn row_to_document(row: DocumentRow) -> Result<Document, DocumentPersistenceError> {
    let name = DocumentName::new(&row.name).map_err(|err| {
        warn!(document_id = %row.document_id, "stored document name failed validation");
        DocumentPersistenceError::query(format!("stored document name is invalid: {err}"))
    })?;
    let file_size = u64::try_from(row.file_size)
        .map_err(|_| DocumentPersistenceError::query("stored file size is negative"))?;
    Ok(Document {
        id: DocumentId::from_uuid(row.document_id),
        name,
        original_name: row.original_name,
        owner: UserId::from_uuid(row.user_id),
        storage_key: StorageKey::from_stored(row.file_path),
        file_size,
        mime_type: row.mime_type,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn create(
        &self,
        document: &NewDocument,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewDocumentRow {
            document_id: *document.id.as_uuid(),
            name: document.name.as_str(),
            original_name: &document.original_name,
            user_id: *document.owner.as_uuid(),
            file_path: document.storage_key.as_str(),
            file_size: file_size_for_db(document.file_size)?,
            mime_type: &document.mime_type,
            created_at: document.created_at,
            updated_at: document.created_at,
        };

        let inserted: Option<DocumentRow> = diesel::insert_into(documents::table)
            .values(&row)
            .returning(DocumentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        inserted.map(row_to_document).transpose()
    }

    async fn find_by_id(
        &self,
        id: &DocumentId,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DocumentRow> = documents::table
            .filter(documents::document_id.eq(id.as_uuid()))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_document).transpose()
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<Document>, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DocumentRow> = documents::table
            .filter(documents::user_id.eq(owner.as_uuid()))
            .order(documents::created_at.desc())
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_document).collect()
    }

    async fn update(
        &self,
        id: &DocumentId,
        owner: &UserId,
        changes: &DocumentChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentPersistenceError> {
        if changes.is_empty() {
            return Ok(None);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let update = DocumentUpdate {
            name: changes.name.as_ref().map(DocumentName::as_str),
            updated_at,
        };
        let row: Option<DocumentRow> = diesel::update(
            documents::table
                .filter(documents::document_id.eq(id.as_uuid()))
                .filter(documents::user_id.eq(owner.as_uuid())),
        )
        .set(&update)
        .returning(DocumentRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map(row_to_document).transpose()
    }

    async fn delete(
        &self,
        id: &DocumentId,
        owner: &UserId,
    ) -> Result<bool, DocumentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(
            documents::table
                .filter(documents::document_id.eq(id.as_uuid()))
                .filter(documents::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentField;
    use chrono::TimeZone;
    use diesel::Column;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(file_size: i64) -> DocumentRow {
        let at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        DocumentRow {
            document_id: Uuid::new_v4(),
            name: "notes".to_owned(),
            original_name: "notes.txt".to_owned(),
            user_id: Uuid::new_v4(),
            file_path: "documents/a-1-notes.txt".to_owned(),
            file_size,
            mime_type: "text/plain".to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn rows_convert_to_documents() {
        let document = row_to_document(row(42)).expect("valid row");
        assert_eq!(document.file_size, 42);
        assert_eq!(document.storage_key.as_str(), "documents/a-1-notes.txt");
    }

    #[rstest]
    fn negative_sizes_are_rejected() {
        let error = row_to_document(row(-1)).expect_err("negative size");
        assert!(matches!(error, DocumentPersistenceError::Query { .. }));
    }

    #[rstest]
    fn field_table_matches_schema_columns() {
        let columns = [
            documents::document_id::NAME,
            documents::name::NAME,
            documents::original_name::NAME,
            documents::user_id::NAME,
            documents::file_path::NAME,
            documents::file_size::NAME,
            documents::mime_type::NAME,
            documents::created_at::NAME,
            documents::updated_at::NAME,
        ];
        let mapped: Vec<&str> = DocumentField::all().map(DocumentField::column).collect();
        assert_eq!(mapped, columns);
    }
}
