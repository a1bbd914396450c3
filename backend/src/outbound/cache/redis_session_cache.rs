//! `SessionCache` implementation over a `bb8-redis` pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;
use tracing::debug;

use crate::domain::UserProfile;
use crate::domain::ports::{SessionCache, SessionCacheError, SessionCacheKey};

/// Build a Redis connection pool for `redis_url`.
///
/// # Errors
///
/// Returns [`SessionCacheError::Backend`] when the URL is invalid or the
/// pool cannot establish its first connection.
pub async fn build_redis_pool(
    redis_url: &str,
    max_size: u32,
) -> Result<Pool<RedisConnectionManager>, SessionCacheError> {
    let manager = RedisConnectionManager::new(redis_url)
        .map_err(|err| SessionCacheError::backend(err.to_string()))?;
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .await
        .map_err(|err| SessionCacheError::backend(err.to_string()))
}

/// Redis-backed [`SessionCache`].
#[derive(Clone)]
pub struct RedisSessionCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisSessionCache {
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

fn encode(profile: &UserProfile) -> Result<String, SessionCacheError> {
    serde_json::to_string(profile).map_err(|err| SessionCacheError::serialization(err.to_string()))
}

fn decode(raw: &str) -> Result<UserProfile, SessionCacheError> {
    serde_json::from_str(raw).map_err(|err| SessionCacheError::serialization(err.to_string()))
}

/// Redis rejects `EX 0`; round sub-second TTLs up to one second.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn backend_error(error: impl std::fmt::Display) -> SessionCacheError {
    SessionCacheError::backend(error.to_string())
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &SessionCacheKey) -> Result<Option<UserProfile>, SessionCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        debug!(%key, hit = raw.is_some(), "session cache lookup");
        raw.as_deref().map(decode).transpose()
    }

    async fn set(
        &self,
        key: &SessionCacheKey,
        profile: &UserProfile,
        ttl: Duration,
    ) -> Result<(), SessionCacheError> {
        let payload = encode(profile)?;
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("EX")
            .arg(expiry_seconds(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn delete(&self, key: &SessionCacheKey) -> Result<(), SessionCacheError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let _removed: i64 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        Ok(())
    }
}
