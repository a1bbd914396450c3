//! Correlation identifier attached to every request and echoed in the
//! `trace-id` response header and in error bodies.
//!
//! Handlers read it through [`TraceId::current`]. The value sits in a Tokio
//! task local, which spawned tasks do not inherit: re-enter it with
//! [`TraceId::scope`] before handing work to another task.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header carrying the trace identifier on requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static TRACE_ID: TraceId;
}

/// A UUID naming one request across logs and responses.
///
/// ```
/// use docvault::domain::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "handling request");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Adopt the caller's identifier when it is a UUID; mint a fresh one
    /// otherwise.
    #[must_use]
    pub fn from_upstream(raw: Option<&str>) -> Self {
        match raw.map(str::trim).map(Self::from_str) {
            Some(Ok(upstream)) => upstream,
            _ => Self::generate(),
        }
    }

    /// Identifier of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}
