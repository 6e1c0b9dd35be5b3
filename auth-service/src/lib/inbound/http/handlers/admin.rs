use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn set_user_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    body: Result<Json<SetUserStatusRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;
    let user_id = UserId::from_string(&user_id).map_err(AuthError::from)?;

    tracing::info!(
        admin_id = %admin.user_id,
        user_id = %user_id,
        is_active = body.is_active,
        "Changing user status"
    );

    state
        .auth_service
        .set_user_active(user_id, body.is_active)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetUserStatusRequest {
    is_active: bool,
}
