use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::auth::errors::CacheError;
use crate::domain::auth::ports::DirectoryCache;

/// Process-local cache with per-entry expiry.
#[derive(Default, Clone)]
pub struct InMemoryDirectoryCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl InMemoryDirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryCache for InMemoryDirectoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;

        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryDirectoryCache::new();

        cache
            .set("short", "1".to_string(), Duration::from_millis(0))
            .await
            .unwrap();
        cache
            .set("long", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap(), Some("2".to_string()));

        cache.delete("long").await.unwrap();
        assert_eq!(cache.get("long").await.unwrap(), None);
    }
}
