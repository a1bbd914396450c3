//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, plus the services that implement the account,
//! session and document use-cases against the ports in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User / UserProfile: stored account and its public projection.
//! - Document / DocumentField: document metadata and its field mapping.
//! - CachedSessionResolver: bearer token to [`CurrentUser`] resolution.
//! - AccountServiceImpl / DocumentServiceImpl: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod document;
pub mod document_service;
pub mod error;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountServiceImpl;
pub use self::auth::{
    CredentialValidationError, LOGIN_REQUIRED_FIELDS, LoginCredentials,
    REGISTRATION_REQUIRED_FIELDS, RegistrationDetails,
};
pub use self::document::{
    ALLOWED_MIME_TYPES, DOCUMENT_NAME_MAX, Document, DocumentChanges, DocumentField, DocumentId,
    DocumentName, DocumentValidationError, NewDocument, StorageKey, is_allowed_mime_type,
};
pub use self::document_service::{DocumentServiceImpl, DocumentSettings};
pub use self::error::{Error, ErrorCode};
pub use self::session::{
    AuthFailureStatus, CachedSessionResolver, CurrentUser, ParseAuthFailureStatusError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NewUser, PasswordHash, ProfileChanges, ProfileField, USER_TEXT_MAX,
    UpdatePayloadError, User, UserId, UserProfile, UserValidationError,
};

