use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::cache::BestEffortCache;
use crate::domain::auth::cache::CacheKey;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::DirectoryCache;
use crate::domain::auth::ports::UserDirectory;

/// Read-through cache in front of a [`UserDirectory`].
///
/// Reads consult the cache first and populate it on a miss. Every write
/// deletes all keys that may hold the affected user once the directory has
/// acknowledged it. A read racing a write may still repopulate the old value
/// until its TTL runs out.
pub struct CachedUserDirectory<UD, DC>
where
    UD: UserDirectory,
    DC: DirectoryCache,
{
    inner: Arc<UD>,
    cache: BestEffortCache<DC>,
}

impl<UD, DC> CachedUserDirectory<UD, DC>
where
    UD: UserDirectory,
    DC: DirectoryCache,
{
    pub fn new(inner: Arc<UD>, cache: BestEffortCache<DC>) -> Self {
        Self { inner, cache }
    }

    /// Role of a user, through the role-by-id key.
    ///
    /// # Returns
    /// None if the user does not exist
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    pub async fn role_of(&self, id: UserId) -> Result<Option<Role>, AuthError> {
        let key = CacheKey::RoleById(id);

        if let Some(role) = self.cache.get::<Role>(&key).await {
            return Ok(Some(role));
        }

        let role = self.find_by_id(id).await?.map(|user| user.role);
        if let Some(role) = &role {
            self.cache.set(&key, role).await;
        }

        Ok(role)
    }

    async fn invalidate_user(&self, user: &User) {
        self.cache.invalidate(&CacheKey::for_user(user)).await;
    }
}

#[async_trait]
impl<UD, DC> UserDirectory for CachedUserDirectory<UD, DC>
where
    UD: UserDirectory,
    DC: DirectoryCache,
{
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let key = CacheKey::UserById(id);

        if let Some(user) = self.cache.get::<User>(&key).await {
            return Ok(Some(user));
        }

        let user = self.inner.find_by_id(id).await?;
        if let Some(user) = &user {
            self.cache.set(&key, user).await;
        }

        Ok(user)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        let key = CacheKey::UserByEmail(email.clone());

        if let Some(user) = self.cache.get::<User>(&key).await {
            return Ok(Some(user));
        }

        let user = self.inner.find_by_email(email).await?;
        if let Some(user) = &user {
            self.cache.set(&key, user).await;
        }

        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, AuthError> {
        let mut users = Vec::with_capacity(ids.len());
        let mut misses = Vec::new();

        for &id in ids {
            match self.cache.get::<User>(&CacheKey::UserById(id)).await {
                Some(user) => users.push(user),
                None => misses.push(id),
            }
        }

        if misses.is_empty() {
            return Ok(users);
        }

        for user in self.inner.find_by_ids(&misses).await? {
            self.cache.set(&CacheKey::UserById(user.id), &user).await;
            users.push(user);
        }

        Ok(users)
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let created = self.inner.create(user).await?;
        self.invalidate_user(&created).await;
        Ok(created)
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let updated = self.inner.update_password_hash(id, password_hash).await?;
        self.invalidate_user(&updated).await;
        Ok(updated)
    }

    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let previous = self.inner.find_by_id(id).await?;
        self.inner.update_last_login(id, at).await?;

        match previous {
            Some(user) => self.invalidate_user(&user).await,
            None => {
                self.cache
                    .invalidate(&[CacheKey::UserById(id), CacheKey::RoleById(id)])
                    .await
            }
        }

        Ok(())
    }

    async fn update(&self, user: User) -> Result<User, AuthError> {
        let previous = self.inner.find_by_id(user.id).await?;
        let updated = self.inner.update(user).await?;

        if let Some(previous) = previous {
            if previous.email != updated.email {
                self.invalidate_user(&previous).await;
            }
        }
        self.invalidate_user(&updated).await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockall::mock;

    use super::*;
    use crate::domain::auth::cache::CacheSettings;
    use crate::domain::auth::errors::CacheError;
    use crate::domain::auth::models::Username;
    use crate::outbound::cache::InMemoryDirectoryCache;
    use crate::outbound::repositories::InMemoryUserDirectory;

    mock! {
        pub TestDirectoryCache {}

        #[async_trait]
        impl DirectoryCache for TestDirectoryCache {
            async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
            async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
            async fn delete(&self, key: &str) -> Result<(), CacheError>;
        }
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            role: Role::user(),
        }
    }

    fn cached(
        inner: Arc<InMemoryUserDirectory>,
        cache: Arc<InMemoryDirectoryCache>,
    ) -> CachedUserDirectory<InMemoryUserDirectory, InMemoryDirectoryCache> {
        CachedUserDirectory::new(inner, BestEffortCache::new(cache, CacheSettings::default()))
    }

    #[tokio::test]
    async fn test_update_is_visible_to_next_read() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let directory = cached(Arc::clone(&inner), Arc::new(InMemoryDirectoryCache::new()));

        let user = directory.create(new_user("alice", "a@b.com")).await.unwrap();

        // Warm every key
        assert!(directory.find_by_id(user.id).await.unwrap().unwrap().is_active);
        assert!(directory
            .find_by_email(&user.email)
            .await
            .unwrap()
            .unwrap()
            .is_active);
        assert_eq!(directory.role_of(user.id).await.unwrap(), Some(Role::user()));

        let mut changed = user.clone();
        changed.is_active = false;
        changed.role = Role::admin();
        directory.update(changed).await.unwrap();

        let by_id = directory.find_by_id(user.id).await.unwrap().unwrap();
        let by_email = directory.find_by_email(&user.email).await.unwrap().unwrap();
        assert!(!by_id.is_active);
        assert!(!by_email.is_active);
        assert_eq!(directory.role_of(user.id).await.unwrap(), Some(Role::admin()));
    }

    #[tokio::test]
    async fn test_password_change_is_visible_to_next_read() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let directory = cached(Arc::clone(&inner), Arc::new(InMemoryDirectoryCache::new()));

        let user = directory.create(new_user("alice", "a@b.com")).await.unwrap();
        directory.find_by_email(&user.email).await.unwrap();

        directory
            .update_password_hash(user.id, "$argon2id$new_hash")
            .await
            .unwrap();

        let by_email = directory.find_by_email(&user.email).await.unwrap().unwrap();
        assert_eq!(by_email.password_hash, "$argon2id$new_hash");
    }

    #[tokio::test]
    async fn test_email_change_drops_old_email_key() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let directory = cached(Arc::clone(&inner), Arc::new(InMemoryDirectoryCache::new()));

        let user = directory.create(new_user("alice", "a@b.com")).await.unwrap();
        directory.find_by_email(&user.email).await.unwrap();

        let mut changed = user.clone();
        changed.email = EmailAddress::new("alice@c.com".to_string()).unwrap();
        directory.update(changed).await.unwrap();

        assert!(directory.find_by_email(&user.email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_are_served_from_cache() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let cache = Arc::new(InMemoryDirectoryCache::new());
        let directory = cached(Arc::clone(&inner), Arc::clone(&cache));

        let user = directory.create(new_user("alice", "a@b.com")).await.unwrap();
        directory.find_by_id(user.id).await.unwrap();

        assert!(cache
            .get(&CacheKey::UserById(user.id).to_string())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_cache_failure_falls_through_to_directory() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let user = inner.create(new_user("alice", "a@b.com")).await.unwrap();

        let mut backend = MockTestDirectoryCache::new();
        backend
            .expect_get()
            .returning(|_| Err(CacheError::Backend("down".to_string())));
        backend
            .expect_set()
            .returning(|_, _, _| Err(CacheError::Backend("down".to_string())));
        backend
            .expect_delete()
            .returning(|_| Err(CacheError::Backend("down".to_string())));

        let directory = CachedUserDirectory::new(
            inner,
            BestEffortCache::new(Arc::new(backend), CacheSettings::default()),
        );

        let found = directory.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.email.as_str(), "a@b.com");
        assert_eq!(directory.role_of(user.id).await.unwrap(), Some(Role::user()));

        let mut changed = found.clone();
        changed.is_active = false;
        assert!(directory.update(changed).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_ids_mixes_cached_and_fetched_users() {
        let inner = Arc::new(InMemoryUserDirectory::new());
        let cache = Arc::new(InMemoryDirectoryCache::new());
        let directory = cached(Arc::clone(&inner), Arc::clone(&cache));

        let alice = directory.create(new_user("alice", "a@b.com")).await.unwrap();
        let bob = directory.create(new_user("bob", "b@b.com")).await.unwrap();

        // Only alice is warm
        directory.find_by_id(alice.id).await.unwrap();

        let mut found = directory
            .find_by_ids(&[alice.id, bob.id, UserId(999)])
            .await
            .unwrap();
        found.sort_by_key(|user| user.id);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].username.as_str(), "alice");
        assert_eq!(found[1].username.as_str(), "bob");
        assert!(cache
            .get(&CacheKey::UserById(bob.id).to_string())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_role_of_unknown_user() {
        let directory = cached(
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryDirectoryCache::new()),
        );

        assert_eq!(directory.role_of(UserId(99)).await.unwrap(), None);
    }
}
