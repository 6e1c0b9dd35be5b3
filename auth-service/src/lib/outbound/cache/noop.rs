use std::time::Duration;

use async_trait::async_trait;

use crate::domain::auth::errors::CacheError;
use crate::domain::auth::ports::DirectoryCache;

/// Cache that stores nothing; every read is a miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDirectoryCache;

#[async_trait]
impl DirectoryCache for NoopDirectoryCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
