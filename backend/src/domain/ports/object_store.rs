//! Port abstraction for blob storage.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::StorageKey;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by object store adapters.
    pub enum ObjectStoreError {
        /// The store could not be reached.
        Unavailable { message: String } => "object store unavailable: {message}",
        /// The store answered with a failure status.
        Rejected { status: u16, message: String } => "object store rejected request ({status}): {message}",
        /// A signed URL could not be produced.
        Signing { message: String } => "object store signing failed: {message}",
    }
}

/// Handle for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: StorageKey,
    pub etag: Option<String>,
}

/// Blob storage holding document bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`.
    async fn upload(
        &self,
        key: &StorageKey,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError>;

    /// Produce a time-limited read URL. `None` when `key` is empty.
    ///
    /// `expiry` falls back to the adapter default when absent.
    async fn signed_url(
        &self,
        key: &StorageKey,
        expiry: Option<Duration>,
    ) -> Result<Option<String>, ObjectStoreError>;

    /// Remove the blob under `key`. Removing a missing blob succeeds.
    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStoreError>;
}
