//! Server settings loaded via OrthoConfig and validated into typed
//! configuration.
//!
//! Every key can be given as a CLI flag (`--jwt-secret`) or as an
//! environment variable with the `DOCVAULT_` prefix (`DOCVAULT_JWT_SECRET`).

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use docvault::domain::{AuthFailureStatus, DocumentSettings};
use docvault::outbound::persistence::PoolConfig;
use docvault::outbound::storage::S3Settings;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STORAGE_REGION: &str = "us-east-1";
const DEFAULT_KEY_PREFIX: &str = "documents";
/// Lifetime of the presigned URLs the object store uses for its own calls.
const STORAGE_REQUEST_EXPIRY: Duration = Duration::from_secs(300);

/// Raw settings as supplied on the command line, in the environment or in a
/// configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DOCVAULT")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub db_min_idle: Option<u32>,
    pub db_connect_timeout_secs: Option<u64>,
    /// Redis connection string for the session cache.
    pub redis_url: Option<String>,
    /// HS256 signing secret.
    pub jwt_secret: Option<String>,
    /// Token validity window in seconds; also the session cache TTL.
    #[ortho_config(default = 3600)]
    pub jwt_expiry_secs: u64,
    /// `legacy` (500) or `unauthorized` (401).
    pub auth_failure_status: Option<String>,
    pub storage_endpoint: Option<String>,
    pub storage_region: Option<String>,
    pub storage_bucket: Option<String>,
    pub storage_access_key: Option<String>,
    pub storage_secret_key: Option<String>,
    pub storage_key_prefix: Option<String>,
    #[ortho_config(default = 900)]
    pub signed_url_expiry_secs: u64,
    #[ortho_config(default = 10_485_760)]
    pub max_upload_bytes: usize,
}

/// Rejected settings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting `{key}`")]
    Missing { key: &'static str },
    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing { key })
}

fn positive_secs(value: u64, key: &'static str) -> Result<Duration, ConfigError> {
    if value == 0 {
        return Err(ConfigError::invalid(key, "must be greater than zero"));
    }
    Ok(Duration::from_secs(value))
}

/// Validated configuration used to wire the server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database: PoolConfig,
    pub(crate) redis_url: String,
    pub(crate) jwt_secret: Zeroizing<String>,
    pub(crate) jwt_expiry: Duration,
    pub(crate) auth_failure_status: AuthFailureStatus,
    pub(crate) storage: S3Settings,
    pub(crate) documents: DocumentSettings,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database", &self.database)
            .field("jwt_expiry", &self.jwt_expiry)
            .field("auth_failure_status", &self.auth_failure_status)
            .field("storage", &self.storage)
            .field("documents", &self.documents)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

impl TryFrom<AppSettings> for ServerConfig {
    type Error = ConfigError;

    fn try_from(settings: AppSettings) -> Result<Self, Self::Error> {
        let bind_addr = settings
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::invalid("bind_addr", err))?;

        let mut database = PoolConfig::new(required(settings.database_url, "database_url")?);
        if let Some(max) = settings.db_max_connections {
            if max == 0 {
                return Err(ConfigError::invalid(
                    "db_max_connections",
                    "must be greater than zero",
                ));
            }
            database = database.with_max_size(max);
        }
        if let Some(idle) = settings.db_min_idle {
            database = database.with_min_idle(Some(idle));
        }
        if let Some(secs) = settings.db_connect_timeout_secs {
            database =
                database.with_connection_timeout(positive_secs(secs, "db_connect_timeout_secs")?);
        }

        let redis_url = required(settings.redis_url, "redis_url")?;
        let jwt_secret = Zeroizing::new(required(settings.jwt_secret, "jwt_secret")?);
        let jwt_expiry = positive_secs(settings.jwt_expiry_secs, "jwt_expiry_secs")?;
        let auth_failure_status = settings
            .auth_failure_status
            .as_deref()
            .map(str::parse::<AuthFailureStatus>)
            .transpose()
            .map_err(|err| ConfigError::invalid("auth_failure_status", err))?
            .unwrap_or_default();

        let endpoint = required(settings.storage_endpoint, "storage_endpoint")?;
        let endpoint =
            Url::parse(&endpoint).map_err(|err| ConfigError::invalid("storage_endpoint", err))?;
        let signed_url_expiry =
            positive_secs(settings.signed_url_expiry_secs, "signed_url_expiry_secs")?;
        let storage = S3Settings {
            endpoint,
            region: settings
                .storage_region
                .filter(|region| !region.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STORAGE_REGION.to_owned()),
            bucket: required(settings.storage_bucket, "storage_bucket")?,
            access_key: required(settings.storage_access_key, "storage_access_key")?,
            secret_key: required(settings.storage_secret_key, "storage_secret_key")?,
            signed_url_expiry,
            request_expiry: STORAGE_REQUEST_EXPIRY,
        };

        if settings.max_upload_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_upload_bytes",
                "must be greater than zero",
            ));
        }
        let documents = DocumentSettings {
            key_prefix: settings
                .storage_key_prefix
                .map(|prefix| prefix.trim_matches('/').to_owned())
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_owned()),
            signed_url_expiry,
            max_upload_bytes: settings.max_upload_bytes,
        };

        Ok(Self {
            bind_addr,
            database,
            redis_url,
            jwt_secret,
            jwt_expiry,
            auth_failure_status,
            storage,
            documents,
        })
    }
}
