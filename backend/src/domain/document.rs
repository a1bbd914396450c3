//! Document metadata and the rules around it.
//!
//! A document is a stored text blob plus a metadata row. The blob lives in
//! the object store under a [`StorageKey`]; the row records who owns it.
//! Only the owner may see or change a document.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::user::{UpdatePayloadError, UserId};

/// MIME types accepted on upload.
pub const ALLOWED_MIME_TYPES: [&str; 1] = ["text/plain"];

/// Maximum display name length, matching the column width.
pub const DOCUMENT_NAME_MAX: usize = 255;

/// Validation errors for document primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentValidationError {
    #[error("document id must be a valid UUID")]
    InvalidId,
    #[error("document name must not be empty")]
    EmptyName,
    #[error("document name must be at most {max} characters")]
    NameTooLong { max: usize },
}

/// Returns true when `mime_type` may be uploaded.
///
/// Parameters such as `; charset=utf-8` are ignored and the comparison is
/// case-insensitive.
pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

/// Stable document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Parse a [`DocumentId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, DocumentValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| DocumentValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name shown for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName(String);

impl DocumentName {
    /// Validate and construct a name. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DocumentValidationError> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Err(DocumentValidationError::EmptyName);
        }
        if name.chars().count() > DOCUMENT_NAME_MAX {
            return Err(DocumentValidationError::NameTooLong {
                max: DOCUMENT_NAME_MAX,
            });
        }
        Ok(Self(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Object store key for a document blob.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use docvault::domain::{StorageKey, UserId};
///
/// let owner = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// let at = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("valid time");
/// let key = StorageKey::derive("documents", &owner, at, "meeting notes.txt");
/// assert_eq!(
///     key.as_str(),
///     "documents/3fa85f64-5717-4562-b3fc-2c963f66afa6-1700000000000-meeting-notes.txt"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the key for a new upload.
    ///
    /// The layout is `{prefix}/{owner}-{epoch millis}-{file name}` with spaces
    /// in the file name replaced by `-`. Path separators are replaced too so
    /// the file name cannot escape the owner's key space.
    pub fn derive(prefix: &str, owner: &UserId, at: DateTime<Utc>, original_name: &str) -> Self {
        let file_name: String = original_name
            .chars()
            .map(|ch| match ch {
                ' ' | '/' | '\\' => '-',
                other => other,
            })
            .collect();
        let prefix = prefix.trim_matches('/');
        let stem = format!("{owner}-{}-{file_name}", at.timestamp_millis());
        if prefix.is_empty() {
            Self(stem)
        } else {
            Self(format!("{prefix}/{stem}"))
        }
    }

    /// Wrap a key read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored document metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub name: DocumentName,
    pub original_name: String,
    pub owner: UserId,
    pub storage_key: StorageKey,
    pub file_size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// True when `user` owns this document.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner == *user
    }
}

/// Fields required to insert a document row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub id: DocumentId,
    pub name: DocumentName,
    pub original_name: String,
    pub owner: UserId,
    pub storage_key: StorageKey,
    pub file_size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Document attributes as they appear in JSON and in the documents table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    Id,
    Name,
    OriginalName,
    Owner,
    StoragePath,
    FileSize,
    MimeType,
    CreatedAt,
    UpdatedAt,
}

struct FieldMapping {
    api_name: &'static str,
    updatable: bool,
}

const fn row(api_name: &'static str, updatable: bool) -> FieldMapping {
    FieldMapping {
        api_name,
        updatable,
    }
}

impl DocumentField {
    /// Every variant, in documents-table column order.
    pub const ALL: [Self; 9] = [
        Self::Id,
        Self::Name,
        Self::OriginalName,
        Self::Owner,
        Self::StoragePath,
        Self::FileSize,
        Self::MimeType,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    /// Every field, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    /// Fields a caller may change through an update.
    pub fn updatable() -> impl Iterator<Item = Self> {
        Self::all().filter(|field| field.mapping().updatable)
    }

    const fn mapping(self) -> FieldMapping {
        match self {
            Self::Id => row("documentId", false),
            Self::Name => row("name", true),
            Self::OriginalName => row("originalName", false),
            Self::Owner => row("userId", false),
            Self::StoragePath => row("filePath", false),
            Self::FileSize => row("fileSize", false),
            Self::MimeType => row("mimeType", false),
            Self::CreatedAt => row("createdAt", false),
            Self::UpdatedAt => row("updatedAt", false),
        }
    }

    /// JSON name used on the wire.
    pub const fn api_name(self) -> &'static str {
        self.mapping().api_name
    }

    /// Column name in the documents table.
    #[cfg(test)]
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Id => "document_id",
            Self::Name => "name",
            Self::OriginalName => "original_name",
            Self::Owner => "user_id",
            Self::StoragePath => "file_path",
            Self::FileSize => "file_size",
            Self::MimeType => "mime_type",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Look up an updatable field by its JSON name.
    pub fn updatable_from_api_name(name: &str) -> Option<Self> {
        Self::updatable().find(|field| field.api_name() == name)
    }
}

/// Validated partial update of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentChanges {
    pub name: Option<DocumentName>,
}

impl DocumentChanges {
    /// Build changes from a JSON object.
    ///
    /// Rejects an empty object and any key outside the updatable set. Keys
    /// mapped to `null` are dropped; if nothing survives the payload is
    /// reported as [`UpdatePayloadError::NoData`].
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, UpdatePayloadError> {
        if fields.is_empty() {
            return Err(UpdatePayloadError::NoData);
        }
        let mut unknown = Vec::new();
        let mut changes = Self::default();
        for (key, value) in fields {
            let Some(field) = DocumentField::updatable_from_api_name(key) else {
                unknown.push(key.clone());
                continue;
            };
            match (field, value) {
                (_, Value::Null) => {}
                (DocumentField::Name, Value::String(raw)) => {
                    let name = DocumentName::new(raw).map_err(|err| {
                        UpdatePayloadError::InvalidValue {
                            field: field.api_name(),
                            reason: err.to_string(),
                        }
                    })?;
                    changes.name = Some(name);
                }
                (_, _) => {
                    return Err(UpdatePayloadError::InvalidValue {
                        field: field.api_name(),
                        reason: "unsupported value type".to_owned(),
                    });
                }
            }
        }
        if !unknown.is_empty() {
            return Err(UpdatePayloadError::InvalidFields { fields: unknown });
        }
        if changes.is_empty() {
            return Err(UpdatePayloadError::NoData);
        }
        Ok(changes)
    }

    /// True when no column would be written.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }
}
