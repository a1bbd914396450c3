//! S3-compatible `ObjectStore` over `reqwest`.
//!
//! Objects are addressed path-style (`{endpoint}/{bucket}/{key}`) so the
//! adapter works against AWS S3 and self-hosted stores such as MinIO alike.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, ETAG};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::domain::StorageKey;
use crate::domain::ports::{ObjectStore, ObjectStoreError, StoredObject};

use super::sigv4::{Credentials, PresignRequest, encode_path, presign_query};

/// Connection settings for [`S3ObjectStore`].
#[derive(Clone)]
pub struct S3Settings {
    pub endpoint: Url,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Default lifetime of signed read URLs.
    pub signed_url_expiry: Duration,
    /// Lifetime of the presigned URLs used for the adapter's own requests.
    pub request_expiry: Duration,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint", &self.endpoint.as_str())
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("signed_url_expiry", &self.signed_url_expiry)
            .finish_non_exhaustive()
    }
}

/// Presigning S3 client.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    base: Url,
    host: String,
    bucket: String,
    credentials: Credentials,
    signed_url_expiry: Duration,
    request_expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("base", &self.base.as_str())
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    /// Build a store for `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::Unavailable`] when the endpoint has no
    /// host.
    pub fn new(
        client: Client,
        settings: S3Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ObjectStoreError> {
        let host = host_header(&settings.endpoint).ok_or_else(|| {
            ObjectStoreError::unavailable(format!(
                "storage endpoint has no host: {}",
                settings.endpoint
            ))
        })?;
        let mut base = settings.endpoint;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            client,
            base,
            host,
            bucket: settings.bucket,
            credentials: Credentials {
                access_key: settings.access_key,
                secret_key: settings.secret_key,
                region: settings.region,
                service: "s3".to_owned(),
            },
            signed_url_expiry: settings.signed_url_expiry,
            request_expiry: settings.request_expiry,
            clock,
        })
    }

    fn object_path(&self, key: &StorageKey) -> String {
        let prefix = self.base.path().trim_end_matches('/');
        format!(
            "{prefix}/{}/{}",
            encode_path(&self.bucket),
            encode_path(key.as_str())
        )
    }

    fn presigned_url(
        &self,
        method: &str,
        key: &StorageKey,
        expiry: Duration,
    ) -> Result<String, ObjectStoreError> {
        let path = self.object_path(key);
        let query = presign_query(
            &self.credentials,
            PresignRequest {
                method,
                host: &self.host,
                path: &path,
                expires_secs: expiry.as_secs(),
                at: self.clock.utc(),
            },
        )
        .map_err(|err| ObjectStoreError::signing(err.to_string()))?;
        Ok(format!(
            "{}://{}{path}?{query}",
            self.base.scheme(),
            self.host
        ))
    }
}

fn host_header(endpoint: &Url) -> Option<String> {
    let host = endpoint.host_str()?;
    Some(match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

fn transport_error(error: reqwest::Error) -> ObjectStoreError {
    ObjectStoreError::unavailable(error.to_string())
}

async fn rejected(response: reqwest::Response) -> ObjectStoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    debug!(status, body = %body, "object store rejected request");
    ObjectStoreError::rejected(status, format!("status {status}"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        key: &StorageKey,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, ObjectStoreError> {
        let url = self.presigned_url("PUT", key, self.request_expiry)?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_DISPOSITION, "inline")
            .body(bytes)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim_matches('"').to_owned());
        Ok(StoredObject {
            key: key.clone(),
            etag,
        })
    }

    async fn signed_url(
        &self,
        key: &StorageKey,
        expiry: Option<Duration>,
    ) -> Result<Option<String>, ObjectStoreError> {
        if key.is_empty() {
            return Ok(None);
        }
        self.presigned_url("GET", key, expiry.unwrap_or(self.signed_url_expiry))
            .map(Some)
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), ObjectStoreError> {
        let url = self.presigned_url("DELETE", key, self.request_expiry)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(rejected(response).await)
    }
}
