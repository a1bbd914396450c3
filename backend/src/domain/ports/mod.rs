//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, cache, object store, tokens, hashing) are
//! implemented in `outbound`; driving ports are implemented by the domain
//! services and called from `inbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod document_repository;
mod document_service;
mod object_store;
mod password_hasher;
mod session_cache;
mod session_resolver;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::{AccountService, AccountSession};
#[cfg(test)]
pub use document_repository::MockDocumentRepository;
pub use document_repository::{DocumentPersistenceError, DocumentRepository};
#[cfg(test)]
pub use document_service::MockDocumentService;
pub use document_service::{CreateDocumentRequest, DocumentService, DocumentView, UploadedFile};
#[cfg(test)]
pub use object_store::MockObjectStore;
pub use object_store::{ObjectStore, ObjectStoreError, StoredObject};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use session_cache::MockSessionCache;
pub use session_cache::{SessionCache, SessionCacheError, SessionCacheKey};
pub use session_resolver::SessionResolver;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
