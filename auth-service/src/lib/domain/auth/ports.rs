use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::CacheError;
use crate::domain::auth::errors::NotifierError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::NewSession;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::Principal;
use crate::domain::auth::models::Provenance;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::Role;
use crate::domain::auth::models::ServiceKey;
use crate::domain::auth::models::Session;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create a user and start its first session.
    ///
    /// # Errors
    /// * `WeakPassword` - Password fails the password policy
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Internal` - Hashing or signing failed
    /// * `DatabaseError` - Directory or session store failed
    async fn register(
        &self,
        command: RegisterCommand,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError>;

    /// Exchange e-mail and password for a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown e-mail or wrong password
    /// * `AccountInactive` - Account is deactivated
    /// * `DatabaseError` - Directory or session store failed
    async fn login(
        &self,
        command: LoginCommand,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError>;

    /// Rotate a refresh token into a new token pair.
    ///
    /// The new session is persisted before the old one is removed.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, expired or not a refresh token
    /// * `SessionRevoked` - No live session holds this token
    /// * `InvalidCredentials` / `AccountInactive` - Subject missing or deactivated
    /// * `DatabaseError` - Directory or session store failed
    async fn refresh_token(
        &self,
        refresh_token: &str,
        provenance: Provenance,
    ) -> Result<AuthSession, AuthError>;

    /// Revoke the session holding `refresh_token`. Unknown tokens are a no-op.
    ///
    /// # Errors
    /// * `DatabaseError` - Session store failed
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Revoke every session of a user.
    ///
    /// # Returns
    /// Number of sessions removed
    ///
    /// # Errors
    /// * `DatabaseError` - Session store failed
    async fn logout_all(&self, user_id: UserId) -> Result<u64, AuthError>;

    /// Replace a user's password and revoke all of their sessions.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `PasswordMismatch` - `current_password` is wrong
    /// * `WeakPassword` - New password fails the password policy
    /// * `DatabaseError` - Directory or session store failed
    async fn change_password(
        &self,
        user_id: UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), AuthError>;

    /// Resolve an access token to its principal without any store lookup.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, expired, malformed or not an access token
    fn validate_access_token(&self, access_token: &str) -> Result<Principal, AuthError>;

    /// Activate or deactivate a user. Deactivation revokes all sessions.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Directory or session store failed
    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<User, AuthError>;

    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Directory failed
    async fn get_user(&self, user_id: UserId) -> Result<User, AuthError>;

    /// Batch lookup for internal services.
    ///
    /// # Returns
    /// The users that exist, in request order; unknown ids are skipped
    ///
    /// # Errors
    /// * `DatabaseError` - Directory failed
    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, AuthError>;

    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Directory failed
    async fn get_user_role(&self, user_id: UserId) -> Result<Role, AuthError>;

    /// Check a raw service key against the stored digest for `service_name`.
    ///
    /// # Errors
    /// * `InvalidServiceKey` - Unknown service or wrong key
    /// * `DatabaseError` - Service key store failed
    async fn validate_service_key(
        &self,
        service_name: &str,
        service_key: &str,
    ) -> Result<(), AuthError>;
}

/// Identity records, owned by the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;

    /// # Returns
    /// Users matching `ids`; unknown ids are absent and order is unspecified
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, AuthError>;

    /// Persist a new user; the directory assigns id and timestamps.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// # Returns
    /// Updated user entity with a fresh `updated_at`
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<User, AuthError>;

    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), AuthError>;

    /// Write username, email, role and status of an existing user.
    ///
    /// # Returns
    /// Updated user entity with a fresh `updated_at`
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, AuthError>;
}

/// Durable record of issued refresh tokens; the sole source of revocation truth.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// # Returns
    /// Identifier of the new session
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, session: NewSession) -> Result<i64, AuthError>;

    /// Look up a live session by its literal refresh token.
    ///
    /// # Returns
    /// None when the token is revoked, expired or was never issued
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<Session>, AuthError>;

    /// # Returns
    /// Whether a session was removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, refresh_token: &str) -> Result<bool, AuthError>;

    /// # Returns
    /// Number of sessions removed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_all_for_user(&self, user_id: UserId) -> Result<u64, AuthError>;
}

/// Raw key/value cache in front of the user directory. Never authoritative.
#[async_trait]
pub trait DirectoryCache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Best-effort delivery of domain events.
#[async_trait]
pub trait EventNotifier: Send + Sync + 'static {
    /// # Errors
    /// * `SerializationFailed` - Event serialization failed
    /// * `PublishFailed` - Event could not be handed to the broker
    async fn notify(&self, event: &AuthEvent) -> Result<(), NotifierError>;
}

/// Lookup of registered service keys.
#[async_trait]
pub trait ServiceKeyStore: Send + Sync + 'static {
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_service(&self, service_name: &str) -> Result<Option<ServiceKey>, AuthError>;
}

// Runtime-selected adapters (e.g. Redis or no-op) are boxed trait objects.

#[async_trait]
impl DirectoryCache for Box<dyn DirectoryCache> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        (**self).set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }
}

#[async_trait]
impl EventNotifier for Box<dyn EventNotifier> {
    async fn notify(&self, event: &AuthEvent) -> Result<(), NotifierError> {
        (**self).notify(event).await
    }
}
