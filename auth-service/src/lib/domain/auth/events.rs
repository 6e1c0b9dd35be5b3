use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;

/// Envelope for all authentication domain events.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    UserCreated(UserCreatedEvent),
    UserLoggedIn(UserLoggedInEvent),
    UserLoggedOut(UserLoggedOutEvent),
    UserUpdated(UserUpdatedEvent),
}

impl AuthEvent {
    pub fn event_id(&self) -> &str {
        match self {
            AuthEvent::UserCreated(e) => &e.event_id,
            AuthEvent::UserLoggedIn(e) => &e.event_id,
            AuthEvent::UserLoggedOut(e) => &e.event_id,
            AuthEvent::UserUpdated(e) => &e.event_id,
        }
    }

    /// Get the event type name.
    ///
    /// # Returns
    /// "user_created", "user_login", "user_logout" or "user_updated"
    pub fn event_type(&self) -> &'static str {
        match self {
            AuthEvent::UserCreated(_) => "user_created",
            AuthEvent::UserLoggedIn(_) => "user_login",
            AuthEvent::UserLoggedOut(_) => "user_logout",
            AuthEvent::UserUpdated(_) => "user_updated",
        }
    }

    /// Extract the user ID this event relates to.
    pub fn user_id(&self) -> UserId {
        match self {
            AuthEvent::UserCreated(e) => e.user_id,
            AuthEvent::UserLoggedIn(e) => e.user_id,
            AuthEvent::UserLoggedOut(e) => e.user_id,
            AuthEvent::UserUpdated(e) => e.user_id,
        }
    }
}

/// Published when a new user registers.
#[derive(Debug, Clone)]
pub struct UserCreatedEvent {
    pub event_id: String,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserCreatedEvent {
    pub fn new(user: &User) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id: user.id,
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

/// Published after a successful password login.
#[derive(Debug, Clone)]
pub struct UserLoggedInEvent {
    pub event_id: String,
    pub user_id: UserId,
    pub ip_address: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

impl UserLoggedInEvent {
    pub fn new(user_id: UserId, ip_address: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id,
            ip_address,
            logged_in_at: Utc::now(),
        }
    }
}

/// Published when one or all sessions of a user are revoked.
#[derive(Debug, Clone)]
pub struct UserLoggedOutEvent {
    pub event_id: String,
    pub user_id: UserId,
    pub sessions_revoked: u64,
    pub logged_out_at: DateTime<Utc>,
}

impl UserLoggedOutEvent {
    pub fn new(user_id: UserId, sessions_revoked: u64) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id,
            sessions_revoked,
            logged_out_at: Utc::now(),
        }
    }
}

/// Published when a user's credentials or status change.
#[derive(Debug, Clone)]
pub struct UserUpdatedEvent {
    pub event_id: String,
    pub user_id: UserId,
    pub is_active: bool,
    pub role: String,
    pub updated_at: DateTime<Utc>,
}

impl UserUpdatedEvent {
    pub fn new(user: &User) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id: user.id,
            is_active: user.is_active,
            role: user.role.as_str().to_string(),
            updated_at: user.updated_at.unwrap_or_else(Utc::now),
        }
    }
}
