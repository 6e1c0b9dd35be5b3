use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::auth::errors::CacheError;
use crate::domain::auth::ports::DirectoryCache;

/// Redis-backed directory cache.
///
/// The connection manager reconnects on its own; calls made while Redis is
/// unreachable fail fast and are treated as misses by the caller.
#[derive(Clone)]
pub struct RedisDirectoryCache {
    conn: ConnectionManager,
}

impl RedisDirectoryCache {
    /// Open a managed connection to `redis_url` (e.g. `redis://localhost:6379/`).
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        tracing::info!("Redis cache connected");

        Ok(Self { conn })
    }
}

#[async_trait]
impl DirectoryCache for RedisDirectoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
