//! AWS Signature Version 4 query-string presigning.
//!
//! Every request the object store adapter makes is presigned: the
//! signature travels in the query string, only `host` is a signed header and
//! the payload is declared `UNSIGNED-PAYLOAD`. The same routine therefore
//! serves uploads, deletes and the read URLs handed to clients.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
const SIGNED_HEADERS: &str = "host";

/// Longest lifetime S3 accepts for a presigned URL (seven days).
pub(crate) const MAX_EXPIRY_SECS: u64 = 604_800;

type HmacSha256 = Hmac<Sha256>;

/// Long-lived signing material.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub service: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

/// A single request to presign.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PresignRequest<'a> {
    pub method: &'a str,
    /// Host header value, including a non-default port.
    pub host: &'a str,
    /// Canonical URI, already percent-encoded.
    pub path: &'a str,
    pub expires_secs: u64,
    pub at: DateTime<Utc>,
}

/// HMAC construction cannot fail for SHA-256; the error exists for the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("hmac key rejected: {0}")]
pub(crate) struct SigningError(String);

/// Percent-encode with the unreserved set SigV4 expects.
pub(crate) fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode an object key for the URI path, keeping `/` separators.
pub(crate) fn encode_path(key: &str) -> String {
    key.split('/').map(encode).collect::<Vec<_>>().join("/")
}

fn hmac(key: &[u8], data: &str) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|err| SigningError(err.to_string()))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(credentials: &Credentials, date: &str) -> Result<Vec<u8>, SigningError> {
    let secret = format!("AWS4{}", credentials.secret_key);
    let date_key = hmac(secret.as_bytes(), date)?;
    let region_key = hmac(&date_key, &credentials.region)?;
    let service_key = hmac(&region_key, &credentials.service)?;
    hmac(&service_key, "aws4_request")
}

/// Produce the full query string, signature included, for `request`.
pub(crate) fn presign_query(
    credentials: &Credentials,
    request: PresignRequest<'_>,
) -> Result<String, SigningError> {
    let amz_date = request.at.format("%Y%m%dT%H%M%SZ").to_string();
    let date = request.at.format("%Y%m%d").to_string();
    let scope = format!(
        "{date}/{}/{}/aws4_request",
        credentials.region, credentials.service
    );
    let expires = request.expires_secs.clamp(1, MAX_EXPIRY_SECS).to_string();

    let mut params = [
        ("X-Amz-Algorithm", ALGORITHM.to_owned()),
        (
            "X-Amz-Credential",
            format!("{}/{scope}", credentials.access_key),
        ),
        ("X-Amz-Date", amz_date.clone()),
        ("X-Amz-Expires", expires),
        ("X-Amz-SignedHeaders", SIGNED_HEADERS.to_owned()),
    ];
    params.sort_by(|a, b| a.0.cmp(b.0));
    let canonical_query = params
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let canonical_request = format!(
        "{}\n{}\n{canonical_query}\nhost:{}\n\n{SIGNED_HEADERS}\n{UNSIGNED_PAYLOAD}",
        request.method, request.path, request.host
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );
    let signature = hex::encode(hmac(
        &signing_key(credentials, &date)?,
        &string_to_sign,
    )?);

    Ok(format!("{canonical_query}&X-Amz-Signature={signature}"))
}
