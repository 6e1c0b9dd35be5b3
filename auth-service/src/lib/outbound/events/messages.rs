use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::events::UserCreatedEvent;
use crate::domain::auth::events::UserLoggedInEvent;
use crate::domain::auth::events::UserLoggedOutEvent;
use crate::domain::auth::events::UserUpdatedEvent;

/// Serializable envelope for all authentication events.
///
/// The `event_type` tag matches [`AuthEvent::event_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum AuthEventMessage {
    #[serde(rename = "user_created")]
    UserCreated(UserCreatedMessage),
    #[serde(rename = "user_login")]
    UserLoggedIn(UserLoggedInMessage),
    #[serde(rename = "user_logout")]
    UserLoggedOut(UserLoggedOutMessage),
    #[serde(rename = "user_updated")]
    UserUpdated(UserUpdatedMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreatedMessage {
    pub event_id: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&UserCreatedEvent> for UserCreatedMessage {
    fn from(event: &UserCreatedEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            user_id: event.user_id.as_i64(),
            username: event.username.clone(),
            email: event.email.clone(),
            role: event.role.clone(),
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLoggedInMessage {
    pub event_id: String,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&UserLoggedInEvent> for UserLoggedInMessage {
    fn from(event: &UserLoggedInEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            user_id: event.user_id.as_i64(),
            ip_address: event.ip_address.clone(),
            timestamp: event.logged_in_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLoggedOutMessage {
    pub event_id: String,
    pub user_id: i64,
    pub sessions_revoked: u64,
    pub timestamp: DateTime<Utc>,
}

impl From<&UserLoggedOutEvent> for UserLoggedOutMessage {
    fn from(event: &UserLoggedOutEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            user_id: event.user_id.as_i64(),
            sessions_revoked: event.sessions_revoked,
            timestamp: event.logged_out_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdatedMessage {
    pub event_id: String,
    pub user_id: i64,
    pub is_active: bool,
    pub role: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserUpdatedEvent> for UserUpdatedMessage {
    fn from(event: &UserUpdatedEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            user_id: event.user_id.as_i64(),
            is_active: event.is_active,
            role: event.role.clone(),
            updated_at: event.updated_at,
        }
    }
}

impl From<&AuthEvent> for AuthEventMessage {
    fn from(event: &AuthEvent) -> Self {
        match event {
            AuthEvent::UserCreated(e) => AuthEventMessage::UserCreated(e.into()),
            AuthEvent::UserLoggedIn(e) => AuthEventMessage::UserLoggedIn(e.into()),
            AuthEvent::UserLoggedOut(e) => AuthEventMessage::UserLoggedOut(e.into()),
            AuthEvent::UserUpdated(e) => AuthEventMessage::UserUpdated(e.into()),
        }
    }
}
