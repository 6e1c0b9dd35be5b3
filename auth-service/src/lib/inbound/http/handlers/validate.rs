use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use super::ApiError;
use crate::inbound::http::middleware::AuthenticatedUser;

pub const USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
pub const USER_ROLE_HEADER: HeaderName = HeaderName::from_static("x-user-role");

/// Echo the principal behind a valid access token, as body and as headers for
/// gateway auth-request integration.
pub async fn validate(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Response, ApiError> {
    let user_id = HeaderValue::from(user.user_id.as_i64());
    let role = HeaderValue::from_str(user.role.as_str())
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    let body = ValidateResponseData {
        user_id: user.user_id.as_i64(),
        role: user.role.as_str().to_string(),
    };

    Ok((
        StatusCode::OK,
        [(USER_ID_HEADER, user_id), (USER_ROLE_HEADER, role)],
        Json(body),
    )
        .into_response())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateResponseData {
    pub user_id: i64,
    pub role: String,
}
