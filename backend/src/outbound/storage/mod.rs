//! Object storage adapters.
//!
//! Document bytes are kept in an S3-compatible bucket. Requests are signed
//! with AWS Signature Version 4 in query-string form.

mod s3_object_store;
mod sigv4;

pub use s3_object_store::{S3ObjectStore, S3Settings};
