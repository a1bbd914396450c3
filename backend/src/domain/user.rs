//! User identity, credentials, and the public profile projection.
//!
//! A [`User`] carries the stored password hash and never leaves the domain or
//! persistence layers. Everything handed to callers or cached goes through
//! [`UserProfile`], which has no credential material.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Error;

/// Maximum length of any text column on the users table.
pub const USER_TEXT_MAX: usize = 255;

/// Validation errors for user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email address must not be empty")]
    EmptyEmail,
    #[error("email address must look like local@domain")]
    InvalidEmail,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Stable user identifier stored as a UUID.
///
/// # Examples
/// ```
/// use docvault::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address used as the login handle. Unique per user.
///
/// Validation is deliberately shallow: trimmed, one `@` with text on both
/// sides, no whitespace, and within the column width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let email = raw.as_ref().trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > USER_TEXT_MAX {
            return Err(UserValidationError::TooLong {
                field: "email",
                max: USER_TEXT_MAX,
            });
        }
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email.to_owned()))
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// PHC-formatted password hash as produced by the password hasher port.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Validate a required personal-name field.
pub(crate) fn person_name(
    field: &'static str,
    raw: &str,
) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyField { field });
    }
    if trimmed.chars().count() > USER_TEXT_MAX {
        return Err(UserValidationError::TooLong {
            field,
            max: USER_TEXT_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Stored user including credential material.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Project the user onto its public profile, dropping the password hash.
    pub fn into_profile(self) -> UserProfile {
        let Self {
            id,
            first_name,
            last_name,
            email,
            password_hash: _,
            created_at,
            updated_at,
        } = self;
        UserProfile {
            user_id: id,
            first_name,
            last_name,
            email,
            created_at,
            updated_at,
        }
    }
}

/// Public user profile. Safe to return to callers and to cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: EmailAddress,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// Profile columns a user may edit, keyed by their JSON names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
}

impl ProfileField {
    /// Every editable profile field, in declaration order.
    pub const UPDATABLE: [Self; 2] = [Self::FirstName, Self::LastName];

    /// JSON name accepted in update payloads.
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
        }
    }

    /// Backing column on the users table.
    pub const fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
        }
    }

    /// Look up a field by its JSON name.
    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::UPDATABLE
            .into_iter()
            .find(|field| field.api_name() == name)
    }
}

/// Reasons a partial update payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdatePayloadError {
    #[error("No data provided for update")]
    NoData,
    #[error("Invalid fields in update data")]
    InvalidFields { fields: Vec<String> },
    #[error("{field} has an invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl UpdatePayloadError {
    /// Convert into a 400 error; unknown fields also list what is accepted.
    pub fn into_error(self, allowed: impl IntoIterator<Item = &'static str>) -> Error {
        let message = self.to_string();
        match self {
            Self::InvalidFields { fields } => Error::invalid_request(message)
                .with_detail("invalidFields", json!(fields))
                .with_detail("allowedFields", json!(allowed.into_iter().collect::<Vec<_>>())),
            Self::NoData | Self::InvalidValue { .. } => Error::invalid_request(message),
        }
    }
}

/// Validated partial update of a user profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileChanges {
    /// Build changes from a JSON object, rejecting unknown keys.
    ///
    /// Keys mapped to `null` are dropped; a payload that drops to nothing is
    /// reported as [`UpdatePayloadError::NoData`].
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, UpdatePayloadError> {
        if fields.is_empty() {
            return Err(UpdatePayloadError::NoData);
        }
        let mut unknown = Vec::new();
        let mut changes = Self::default();
        for (key, value) in fields {
            let Some(field) = ProfileField::from_api_name(key) else {
                unknown.push(key.clone());
                continue;
            };
            let text = match value {
                Value::Null => continue,
                Value::String(text) => text,
                _ => {
                    return Err(UpdatePayloadError::InvalidValue {
                        field: field.api_name(),
                        reason: "expected a string".to_owned(),
                    });
                }
            };
            let name = person_name(field.api_name(), text).map_err(|err| {
                UpdatePayloadError::InvalidValue {
                    field: field.api_name(),
                    reason: err.to_string(),
                }
            })?;
            match field {
                ProfileField::FirstName => changes.first_name = Some(name),
                ProfileField::LastName => changes.last_name = Some(name),
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
        self.first_name.is_none() && self.last_name.is_none()
    }
}
