//! Docvault library modules.
//!
//! The binary in `main.rs` wires these layers into an Actix server; the
//! library is kept separate so integration tests and tooling can build the
//! same application from in-memory adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
