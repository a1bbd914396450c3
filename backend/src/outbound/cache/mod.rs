//! Redis-backed session cache adapter.
//!
//! Profiles are stored as JSON strings under the session key with `SET .. EX`
//! so Redis expires them on its own. Connections come from a `bb8-redis`
//! pool; checkout failures and command errors surface as
//! [`SessionCacheError::Backend`], which the session resolver downgrades to a
//! cache miss.

mod redis_session_cache;

pub use redis_session_cache::{RedisSessionCache, build_redis_pool};
