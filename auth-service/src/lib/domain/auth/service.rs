use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::PasswordPolicy;
use auth::TokenPair;
use auth::TokenType;
use chrono::Utc;

use crate::domain::auth::cache::BestEffortCache;
use crate::domain::auth::cache::CacheKey;
use crate::domain::auth::cache::CacheSettings;
use crate::domain::auth::directory::CachedUserDirectory;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::events::UserCreatedEvent;
use crate::domain::auth::events::UserLoggedInEvent;
use crate::domain::auth::events::UserLoggedOutEvent;
use crate::domain::auth::events::UserUpdatedEvent;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::NewSession;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::Principal;
use crate::domain::auth::models::Provenance;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::ServiceKey;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::DirectoryCache;
use crate::domain::auth::ports::EventNotifier;
use crate::domain::auth::ports::ServiceKeyStore;
use crate::domain::auth::ports::SessionStore;
use crate::domain::auth::ports::UserDirectory;

/// Auth orchestrator.
///
/// Coordinates the user directory, session store, directory cache, event
/// notifier and service key store. Any of the optional collaborators can be
/// swapped for a no-op adapter without changing this type.
pub struct AuthService<UD, SS, DC, EN, SK>
where
    UD: UserDirectory,
    SS: SessionStore,
    DC: DirectoryCache,
    EN: EventNotifier,
    SK: ServiceKeyStore,
{
    directory: CachedUserDirectory<UD, DC>,
    sessions: Arc<SS>,
    service_keys: Arc<SK>,
    cache: BestEffortCache<DC>,
    notifier: Arc<EN>,
    authenticator: Arc<Authenticator>,
    password_policy: PasswordPolicy,
}

impl<UD, SS, DC, EN, SK> AuthService<UD, SS, DC, EN, SK>
where
    UD: UserDirectory,
    SS: SessionStore,
    DC: DirectoryCache,
    EN: EventNotifier,
    SK: ServiceKeyStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User directory implementation
    /// * `sessions` - Session store implementation
    /// * `service_keys` - Service key store implementation
    /// * `cache` - Directory cache backend (may be a no-op)
    /// * `notifier` - Event notifier (may be a no-op)
    /// * `authenticator` - Password hashing and token issuance
    /// * `cache_settings` - Cache timeout and TTLs
    pub fn new(
        users: Arc<UD>,
        sessions: Arc<SS>,
        service_keys: Arc<SK>,
        cache: Arc<DC>,
        notifier: Arc<EN>,
        authenticator: Arc<Authenticator>,
        cache_settings: CacheSettings,
    ) -> Self {
        let cache = BestEffortCache::new(cache, cache_settings);

        Self {
            directory: CachedUserDirectory::new(users, cache.clone()),
            sessions,
            service_keys,
            cache,
            notifier,
            authenticator,
            password_policy: PasswordPolicy::default(),
        }
    }

    pub fn with_password_policy(mut self, password_policy: PasswordPolicy) -> Self {
        self.password_policy = password_policy;
        self
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let current_span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| authenticator.hash_password(&password))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Returns `Ok(false)` on mismatch; only an unusable stored hash is an error.
    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let current_span = tracing::Span::current();

        let outcome = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| authenticator.verify_password(&password, &hash))
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(AuthenticationError::InvalidCredentials) => Ok(false),
            Err(e) => Err(AuthError::Internal(e.to_string())),
        }
    }

    /// Issue a token pair for `user` and persist its refresh session.
    async fn start_session(
        &self,
        user: &User,
        provenance: Provenance,
    ) -> Result<TokenPair, AuthError> {
        let pair = self
            .authenticator
            .issue_pair(user.id.as_i64(), user.role.as_str())
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        let session_id = self
            .sessions
            .create(NewSession {
                user_id: user.id,
                refresh_token: pair.refresh_token.clone(),
                expires_at: pair.refresh_expires_at,
                provenance,
            })
            .await?;

        tracing::debug!(user_id = %user.id, session_id, "Session created");

        Ok(pair)
    }

    /// Best-effort last-login stamp; returns the user as it should be reported.
    async fn record_login(&self, mut user: User) -> User {
        let now = Utc::now();

        match self.directory.update_last_login(user.id, now).await {
            Ok(()) => user.last_login = Some(now),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to update last login");
            }
        }

        user
    }

    async fn notify(&self, event: AuthEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            tracing::error!(
                event_type = event.event_type(),
                user_id = %event.user_id(),
                error = %e,
                "Failed to publish event"
            );
        }
    }

    async fn require_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.directory
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound(user_id.to_string()))
    }
}

#[async_trait]
impl<UD, SS, DC, EN, SK> AuthServicePort for AuthService<UD, SS, DC, EN, SK>
where
    UD: UserDirectory,
    SS: SessionStore,
    DC: DirectoryCache,
    EN: EventNotifier,
    SK: ServiceKeyStore,
{
    async fn register(
        &self,
        command: RegisterCommand,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError> {
        self.password_policy.validate(&command.password)?;

        if self.directory.find_by_email(&command.email).await?.is_some() {
            tracing::info!(email = %command.email, "Registration with existing email rejected");
            return Err(AuthError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = self
            .directory
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
                role: command.role.unwrap_or_default(),
            })
            .await?;

        let pair = self.start_session(&user, provenance).await?;
        let user = self.record_login(user).await;

        tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "User registered");
        self.notify(AuthEvent::UserCreated(UserCreatedEvent::new(&user)))
            .await;

        Ok(AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
            user,
        })
    }

    async fn login(
        &self,
        command: LoginCommand,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError> {
        let Some(user) = self.directory.find_by_email(&command.email).await? else {
            tracing::warn!(email = %command.email, "Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(command.password, user.password_hash.clone())
            .await?
        {
            tracing::warn!(user_id = %user.id, email = %user.email, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Login to inactive account");
            return Err(AuthError::AccountInactive);
        }

        let ip_address = provenance.ip_address.clone();
        let pair = self.start_session(&user, provenance).await?;
        let user = self.record_login(user).await;

        tracing::info!(user_id = %user.id, "User logged in");
        self.notify(AuthEvent::UserLoggedIn(UserLoggedInEvent::new(
            user.id, ip_address,
        )))
        .await;

        Ok(AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
            user,
        })
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError> {
        let claims = self
            .authenticator
            .validate_token(refresh_token, TokenType::Refresh)
            .inspect_err(|e| tracing::warn!(error = %e, "Refresh token rejected"))?;

        let session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .filter(|session| session.user_id.as_i64() == claims.sub)
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.sub, "Refresh token has no live session");
                AuthError::SessionRevoked
            })?;

        let Some(user) = self.directory.find_by_id(session.user_id).await? else {
            tracing::warn!(user_id = %session.user_id, "Refresh for missing user");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Refresh for inactive account");
            return Err(AuthError::AccountInactive);
        }

        // The role comes from the directory, not the presented claim.
        let pair = self.start_session(&user, provenance).await?;

        match self.sessions.delete(refresh_token).await {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                user_id = %user.id,
                "Rotated session was already gone (concurrent refresh or logout)"
            ),
            Err(e) => tracing::error!(
                user_id = %user.id,
                error = %e,
                "Failed to delete rotated session"
            ),
        }

        tracing::info!(user_id = %user.id, "Token refreshed");

        Ok(AuthSession {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.access_expires_at,
            user,
        })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let session = self.sessions.find_by_token(refresh_token).await?;

        if !self.sessions.delete(refresh_token).await? {
            tracing::debug!("Logout for unknown session");
            return Ok(());
        }

        if let Some(session) = session {
            tracing::info!(user_id = %session.user_id, "User logged out");
            self.notify(AuthEvent::UserLoggedOut(UserLoggedOutEvent::new(
                session.user_id,
                1,
            )))
            .await;
        }

        Ok(())
    }

    async fn logout_all(&self, user_id: UserId) -> Result<u64, AuthError> {
        let revoked = self.sessions.delete_all_for_user(user_id).await?;

        tracing::info!(user_id = %user_id, sessions_revoked = revoked, "All sessions revoked");
        self.notify(AuthEvent::UserLoggedOut(UserLoggedOutEvent::new(
            user_id, revoked,
        )))
        .await;

        Ok(revoked)
    }

    async fn change_password(
        &self,
        user_id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError> {
        let user = self.require_user(user_id).await?;

        if !self
            .verify_password(command.current_password, user.password_hash.clone())
            .await?
        {
            tracing::warn!(user_id = %user_id, "Password change with wrong current password");
            return Err(AuthError::PasswordMismatch);
        }

        self.password_policy.validate(&command.new_password)?;

        let password_hash = self.hash_password(command.new_password).await?;
        let updated = self
            .directory
            .update_password_hash(user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        self.logout_all(user_id).await?;

        self.notify(AuthEvent::UserUpdated(UserUpdatedEvent::new(&updated)))
            .await;

        Ok(())
    }

    fn validate_access_token(&self, access_token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .authenticator
            .validate_token(access_token, TokenType::Access)?;

        let user_id = UserId::try_from(claims.sub).map_err(|e| {
            AuthError::InvalidToken(auth::JwtError::Malformed(e.to_string()))
        })?;
        let role = Role::new(claims.role).map_err(|e| {
            AuthError::InvalidToken(auth::JwtError::Malformed(e.to_string()))
        })?;

        Ok(Principal { user_id, role })
    }

    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<User, AuthError> {
        let mut user = self.require_user(user_id).await?;
        user.is_active = active;

        let updated = self.directory.update(user).await?;
        tracing::info!(user_id = %user_id, is_active = active, "User status changed");

        if !active {
            self.logout_all(user_id).await?;
        }

        self.notify(AuthEvent::UserUpdated(UserUpdatedEvent::new(&updated)))
            .await;

        Ok(updated)
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.require_user(user_id).await
    }

    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, AuthError> {
        let mut requested: Vec<UserId> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if !requested.contains(id) {
                requested.push(*id);
            }
        }

        let mut found = self.directory.find_by_ids(&requested).await?;
        found.sort_by_key(|user| requested.iter().position(|id| *id == user.id));

        tracing::debug!(requested = requested.len(), found = found.len(), "Batch user lookup");
        Ok(found)
    }

    async fn get_user_role(&self, user_id: UserId) -> Result<Role, AuthError> {
        self.directory
            .role_of(user_id)
            .await?
            .ok_or(AuthError::UserNotFound(user_id.to_string()))
    }

    async fn validate_service_key(
        &self,
        service_name: &str,
        service_key: &str,
    ) -> Result<(), AuthError> {
        let key_hash = ServiceKey::hash_secret(service_key);
        let cache_key = CacheKey::ServiceKey(service_name.to_string());

        if self.cache.get::<String>(&cache_key).await.as_deref() == Some(key_hash.as_str()) {
            return Ok(());
        }

        match self.service_keys.find_by_service(service_name).await? {
            Some(stored) if stored.key_hash == key_hash => {
                self.cache.set(&cache_key, &stored.key_hash).await;
                Ok(())
            }
            _ => {
                tracing::warn!(service_name, "Invalid service key");
                Err(AuthError::InvalidServiceKey)
            }
        }
    }
}
