//! Transport-neutral service errors. `inbound::http::error` renders them as
//! the JSON error envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::TraceId;

/// Failure category, serialised as the `code` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authentication failed and the deployment reports it as a server fault.
    ///
    /// Existing clients of the document API expect authentication failures
    /// to arrive with a 5xx status; see [`crate::domain::AuthFailureStatus`].
    AuthenticationFailed,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A collaborator accepted the call but produced no effect.
    DependencyFailed,
    /// A backing service is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized | Self::AuthenticationFailed => "Authentication failed",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::DependencyFailed => "Dependency failed",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Failure reported by a domain service.
///
/// The message is never blank, and the [`TraceId`] in scope at construction
/// is captured for the error body. `details` are extra top-level fields of
/// that body, such as `allowedFileTypes`.
///
/// ```
/// use docvault::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "Document not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::forbidden("  ").message(), "Forbidden");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Map<String, Value>,
    trace_id: Option<String>,
}

macro_rules! shorthand {
    ($($name:ident => $code:ident),* $(,)?) => {
        $(
            #[doc = concat!("[`ErrorCode::", stringify!($code), "`] with `message`.")]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = match message.into() {
            blank if blank.trim().is_empty() => code.fallback_message().to_owned(),
            message => message,
        };
        Self {
            code,
            message,
            details: Map::new(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    shorthand! {
        invalid_request => InvalidRequest,
        unauthorized => Unauthorized,
        authentication_failed => AuthenticationFailed,
        forbidden => Forbidden,
        not_found => NotFound,
        dependency_failed => DependencyFailed,
        service_unavailable => ServiceUnavailable,
        internal => InternalError,
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Add a top-level field to the error body.
    ///
    /// ```
    /// use docvault::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("Required fields are missing")
    ///     .with_detail("requiredFields", json!(["file"]));
    /// assert_eq!(err.details().get("requiredFields"), Some(&json!(["file"])));
    /// ```
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Replace the captured trace identifier.
    pub fn with_trace_id(self, trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..self
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
