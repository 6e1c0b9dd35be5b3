use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::User;

pub mod admin;
pub mod change_password;
pub mod health;
pub mod login;
pub mod logout;
pub mod logout_all;
pub mod refresh_token;
pub mod register;
pub mod service;
pub mod validate;

pub(crate) const INVALID_CREDENTIALS: &str = "invalid credentials";
pub(crate) const INVALID_TOKEN: &str = "invalid token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
}

impl ApiError {
    /// Collapse every authentication failure into the uniform login message.
    pub fn from_login(err: AuthError) -> Self {
        if err.is_authentication_failure() {
            ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
        } else {
            ApiError::from(err)
        }
    }

    /// Collapse every authentication failure into the uniform token message.
    pub fn from_token(err: AuthError) -> Self {
        if err.is_authentication_failure() {
            ApiError::Unauthorized(INVALID_TOKEN.to_string())
        } else {
            ApiError::from(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidUserId(_)
            | AuthError::InvalidUsername(_)
            | AuthError::InvalidEmail(_)
            | AuthError::InvalidRole(_)
            | AuthError::WeakPassword(_)
            | AuthError::EmailAlreadyExists(_)
            | AuthError::PasswordMismatch => ApiError::BadRequest(err.to_string()),
            AuthError::InvalidCredentials | AuthError::AccountInactive => {
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            AuthError::InvalidToken(_) | AuthError::SessionRevoked => {
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
            AuthError::InvalidServiceKey => ApiError::Unauthorized(err.to_string()),
            AuthError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            AuthError::Internal(_) | AuthError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// User as exposed over HTTP; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            role: user.role.as_str().to_string(),
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Token bundle returned by register, login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserData,
}

impl From<&AuthSession> for AuthSessionData {
    fn from(session: &AuthSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            user: (&session.user).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtError;

    use super::*;
    use crate::domain::auth::errors::EmailError;

    #[test]
    fn test_authentication_failures_use_uniform_messages() {
        assert_eq!(
            ApiError::from_login(AuthError::AccountInactive),
            ApiError::Unauthorized("invalid credentials".to_string())
        );
        assert_eq!(
            ApiError::from_token(AuthError::AccountInactive),
            ApiError::Unauthorized("invalid token".to_string())
        );
        assert_eq!(
            ApiError::from_token(AuthError::InvalidToken(JwtError::TokenExpired)),
            ApiError::Unauthorized("invalid token".to_string())
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::EmailAlreadyExists("a@b.com".to_string())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidEmail(EmailError::InvalidFormat(
                "nope".to_string()
            ))),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserNotFound("7".to_string())),
            ApiError::NotFound(_)
        ));
        assert_eq!(
            ApiError::from(AuthError::DatabaseError("connection reset".to_string())),
            ApiError::InternalServerError("internal server error".to_string())
        );
    }

    #[test]
    fn test_error_body_shape() {
        let response = ApiError::Forbidden("insufficient role".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
