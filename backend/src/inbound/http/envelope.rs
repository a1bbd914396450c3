//! Uniform JSON envelope wrapping every HTTP response body.
//!
//! ```text
//! {"status":"success","message":"Documents fetched successfully","data":[...]}
//! {"status":"error","message":"Document not found","code":"not_found","traceId":"..."}
//! ```
//!
//! Error details are flattened next to `message` so clients can read keys
//! such as `requiredFields` or `allowedFileTypes` without nesting.

use actix_web::HttpResponse;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use utoipa::ToSchema;

use crate::domain::Error;

/// Outcome marker carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    status: EnvelopeStatus,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> SuccessEnvelope<T> {
    /// Wrap `data` under `message`.
    pub fn new(message: &'static str, data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message,
            data: Some(data),
        }
    }

    /// Render as a `200 OK` JSON response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

impl SuccessEnvelope<()> {
    /// Envelope with a message and no `data` key.
    pub fn message_only(message: &'static str) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message,
            data: None,
        }
    }
}

/// Respond `200 OK` with `data` wrapped in a success envelope.
pub fn ok<T: Serialize>(message: &'static str, data: T) -> HttpResponse {
    SuccessEnvelope::new(message, data).into_response()
}

/// Error response body borrowed from a domain [`Error`].
///
/// Detail keys that would shadow the envelope's own fields are dropped.
pub struct ErrorEnvelope<'a>(pub &'a Error);

const RESERVED_KEYS: [&str; 4] = ["status", "message", "code", "traceId"];

impl Serialize for ErrorEnvelope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let error = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", &EnvelopeStatus::Error)?;
        map.serialize_entry("message", error.message())?;
        map.serialize_entry("code", &error.code())?;
        if let Some(trace_id) = error.trace_id() {
            map.serialize_entry("traceId", trace_id)?;
        }
        for (key, value) in error
            .details()
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// OpenAPI shape of [`ErrorEnvelope`].
#[derive(Serialize, ToSchema)]
#[schema(as = ErrorBody)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code, reason = "documentation-only schema")]
pub struct ErrorBodySchema {
    status: EnvelopeStatus,
    #[schema(example = "Document not found")]
    message: String,
    #[schema(example = "not_found")]
    code: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}
