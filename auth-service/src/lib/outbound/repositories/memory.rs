use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::NewSession;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::ServiceKey;
use crate::domain::auth::models::Session;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::ServiceKeyStore;
use crate::domain::auth::ports::SessionStore;
use crate::domain::auth::ports::UserDirectory;

/// Process-local user directory for tests and single-node development.
#[derive(Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| &user.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, AuthError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(AuthError::EmailAlreadyExists(user.email.to_string()));
        }

        let id = UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: None,
        };

        users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or(AuthError::UserNotFound(id.to_string()))?;

        user.password_hash = password_hash.to_string();
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or(AuthError::UserNotFound(id.to_string()))?;

        user.last_login = Some(at);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(AuthError::EmailAlreadyExists(user.email.to_string()));
        }

        let stored = users
            .get_mut(&user.id)
            .ok_or(AuthError::UserNotFound(user.id.to_string()))?;

        stored.username = user.username;
        stored.email = user.email;
        stored.role = user.role;
        stored.is_active = user.is_active;
        stored.updated_at = Some(Utc::now());

        Ok(stored.clone())
    }
}

/// Process-local session store keyed by refresh token.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions for a user, including expired ones.
    pub async fn count_for_user(&self, user_id: UserId) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .filter(|session| session.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: NewSession) -> Result<i64, AuthError> {
        let mut sessions = self.sessions.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        sessions.insert(
            session.refresh_token.clone(),
            Session {
                id,
                user_id: session.user_id,
                refresh_token: session.refresh_token,
                expires_at: session.expires_at,
                ip_address: session.provenance.ip_address,
                user_agent: session.provenance.user_agent,
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self.sessions.read().await;
        let now = Utc::now();

        Ok(sessions
            .get(refresh_token)
            .filter(|session| !session.is_expired(now))
            .cloned())
    }

    async fn delete(&self, refresh_token: &str) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(refresh_token).is_some())
    }

    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

/// Process-local service key registry.
#[derive(Default, Clone)]
pub struct InMemoryServiceKeyStore {
    keys: Arc<RwLock<HashMap<String, ServiceKey>>>,
}

impl InMemoryServiceKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `secret` for `service_name`, replacing any previous key.
    pub async fn register(&self, service_name: &str, secret: &str) {
        let mut keys = self.keys.write().await;
        keys.insert(
            service_name.to_string(),
            ServiceKey {
                service_name: service_name.to_string(),
                key_hash: ServiceKey::hash_secret(secret),
            },
        );
    }
}

#[async_trait]
impl ServiceKeyStore for InMemoryServiceKeyStore {
    async fn find_by_service(&self, service_name: &str) -> Result<Option<ServiceKey>, AuthError> {
        let keys = self.keys.read().await;
        Ok(keys.get(service_name).cloned())
    }
}
