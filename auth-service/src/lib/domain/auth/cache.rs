use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::auth::errors::CacheError;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::DirectoryCache;

/// Semantic cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    UserById(UserId),
    UserByEmail(EmailAddress),
    RoleById(UserId),
    ServiceKey(String),
}

impl CacheKey {
    /// Every key that may hold a copy of `user`.
    pub fn for_user(user: &User) -> Vec<CacheKey> {
        vec![
            CacheKey::UserById(user.id),
            CacheKey::UserByEmail(user.email.clone()),
            CacheKey::RoleById(user.id),
        ]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::UserById(id) => write!(f, "auth:user:id:{}", id),
            CacheKey::UserByEmail(email) => write!(f, "auth:user:email:{}", email),
            CacheKey::RoleById(id) => write!(f, "auth:user:role:{}", id),
            CacheKey::ServiceKey(name) => write!(f, "auth:service_key:{}", name),
        }
    }
}

/// Timeout and per-key-class TTLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Upper bound for any single cache call
    pub timeout: Duration,
    pub user_ttl: Duration,
    pub role_ttl: Duration,
    pub service_key_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(50),
            user_ttl: Duration::from_secs(300),
            role_ttl: Duration::from_secs(300),
            service_key_ttl: Duration::from_secs(600),
        }
    }
}

impl CacheSettings {
    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::UserById(_) | CacheKey::UserByEmail(_) => self.user_ttl,
            CacheKey::RoleById(_) => self.role_ttl,
            CacheKey::ServiceKey(_) => self.service_key_ttl,
        }
    }
}

/// Typed, best-effort facade over a [`DirectoryCache`].
///
/// Backend errors, timeouts and undecodable values all behave as a miss and
/// are only logged.
pub struct BestEffortCache<DC>
where
    DC: DirectoryCache,
{
    backend: Arc<DC>,
    settings: CacheSettings,
}

impl<DC> Clone for BestEffortCache<DC>
where
    DC: DirectoryCache,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            settings: self.settings,
        }
    }
}

impl<DC> BestEffortCache<DC>
where
    DC: DirectoryCache,
{
    pub fn new(backend: Arc<DC>, settings: CacheSettings) -> Self {
        Self { backend, settings }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw_key = key.to_string();

        let fetched = self
            .bounded(self.backend.get(&raw_key))
            .await
            .and_then(|raw| raw.map(|raw| decode::<T>(&raw)).transpose());

        match fetched {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key = %raw_key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let raw_key = key.to_string();

        let ttl = self.settings.ttl_for(key);

        let stored = match encode(value) {
            Ok(raw) => self.bounded(self.backend.set(&raw_key, raw, ttl)).await,
            Err(e) => Err(e),
        };

        if let Err(e) = stored {
            tracing::debug!(key = %raw_key, error = %e, "Cache write failed");
        }
    }

    /// Delete every key, continuing past failures.
    pub async fn invalidate(&self, keys: &[CacheKey]) {
        for key in keys {
            let raw_key = key.to_string();
            if let Err(e) = self.bounded(self.backend.delete(&raw_key)).await {
                tracing::warn!(key = %raw_key, error = %e, "Cache invalidation failed");
            }
        }
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.settings.timeout, operation)
            .await
            .unwrap_or(Err(CacheError::Timeout))
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CacheError> {
    serde_json::from_str(raw).map_err(|e| CacheError::Serialization(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<String, CacheError> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
}
