//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::info;

use docvault::domain::ports::{AccountService, DocumentService, SessionResolver};
use docvault::domain::{AccountServiceImpl, CachedSessionResolver, DocumentServiceImpl};
use docvault::inbound::http::state::HttpState;
use docvault::outbound::cache::{RedisSessionCache, build_redis_pool};
use docvault::outbound::password::Argon2PasswordHasher;
use docvault::outbound::persistence::{DbPool, DieselDocumentRepository, DieselUserRepository};
use docvault::outbound::storage::S3ObjectStore;
use docvault::outbound::token::JwtTokenService;

use super::ServerConfig;

const REDIS_POOL_SIZE: u32 = 16;

/// Connect every outbound adapter and assemble the driving services.
///
/// # Errors
///
/// Fails when the database or Redis pool cannot be built, or when the token
/// or storage settings are rejected by their adapters.
pub async fn build_http_state(config: &ServerConfig) -> Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let pool = DbPool::new(config.database.clone())
        .await
        .wrap_err("failed to build database pool")?;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let documents_repo = Arc::new(DieselDocumentRepository::new(pool));

    let redis = build_redis_pool(&config.redis_url, REDIS_POOL_SIZE)
        .await
        .wrap_err("failed to build redis pool")?;
    let cache = Arc::new(RedisSessionCache::new(redis));

    let tokens = Arc::new(
        JwtTokenService::new(
            config.jwt_secret.as_bytes(),
            config.jwt_expiry,
            clock.clone(),
        )
        .wrap_err("invalid token settings")?,
    );

    let store = Arc::new(
        S3ObjectStore::new(
            reqwest::Client::new(),
            config.storage.clone(),
            clock.clone(),
        )
        .wrap_err("invalid storage settings")?,
    );

    let accounts: Arc<dyn AccountService> = Arc::new(AccountServiceImpl::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher),
        tokens.clone(),
        cache.clone(),
        clock.clone(),
    ));
    let sessions: Arc<dyn SessionResolver> = Arc::new(
        CachedSessionResolver::new(users, cache, tokens)
            .with_failure_status(config.auth_failure_status),
    );
    let documents: Arc<dyn DocumentService> = Arc::new(DocumentServiceImpl::new(
        documents_repo,
        store,
        clock,
        config.documents.clone(),
    ));

    info!(
        auth_failure_status = ?config.auth_failure_status,
        max_upload_bytes = config.documents.max_upload_bytes,
        "service dependencies ready"
    );

    Ok(HttpState::new(accounts, sessions, documents)
        .with_upload_limit(config.documents.max_upload_bytes))
}
