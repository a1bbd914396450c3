//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed user and document repositories
//!   using Diesel ORM
//! - **cache**: Redis-backed session cache
//! - **storage**: S3-compatible object store for document bytes
//! - **token**: JWT bearer tokens
//! - **password**: Argon2id password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod password;
pub mod persistence;
pub mod storage;
pub mod token;
