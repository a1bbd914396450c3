//! PostgreSQL adapters for the user and document repository ports.
//!
//! Queries run through `diesel-async` on a shared bb8 pool ([`DbPool`]).
//! Row structs and the `table!` schema stay private to this module; the
//! adapters convert rows into domain values and report every database
//! failure through the port's `connection` or `query` variant. Ownership
//! checks live in the domain services, but update and delete statements
//! also filter on the owner column so a stale check cannot touch another
//! user's row.
//!
//! # Example
//!
//! ```no_run
//! use docvault::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), docvault::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/docvault")).await?;
//! let users = DieselUserRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_document_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_document_repository::DieselDocumentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, PoolStage};
