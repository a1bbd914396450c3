//! Test utilities for the docvault crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for unit tests and when
//! the `test-support` feature is enabled.

mod clock;
mod memory;

pub use clock::FixtureClock;
pub use memory::{
    InMemoryDocumentRepository, InMemoryObjectStore, InMemorySessionCache,
    InMemoryUserRepository, PlaintextPasswordHasher,
};

pub mod openapi {
    //! Helpers for asserting on generated OpenAPI schemas.

    use utoipa::openapi::schema::{Object, Schema};
    use utoipa::openapi::RefOr;

    /// Unwrap an inline object schema or panic with the schema name.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(object)) => object,
            _ => panic!("{name} schema should be an inline object"),
        }
    }

    /// Fetch a property schema or panic with the property name.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        obj.properties
            .get(field)
            .unwrap_or_else(|| panic!("{field} property missing"))
    }
}
