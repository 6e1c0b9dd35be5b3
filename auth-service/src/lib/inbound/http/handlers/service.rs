use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::UserId;
use crate::inbound::http::middleware::AuthenticatedService;
use crate::inbound::http::router::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedService>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(AuthError::from)?;
    tracing::debug!(service = %caller.service_name, user_id = %user_id, "Service user lookup");

    state
        .auth_service
        .get_user(user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// `GET /service/users/batch?ids=1,2,3`. Unparseable ids are skipped and
/// unknown ids are absent from the response.
pub async fn get_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedService>,
    Query(query): Query<BatchUsersQuery>,
) -> Result<ApiSuccess<UsersResponseData>, ApiError> {
    let raw = query.ids.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(ApiError::BadRequest("user ids required".to_string()));
    }

    let user_ids = parse_user_ids(&raw);
    if user_ids.is_empty() {
        return Err(ApiError::BadRequest("no valid user ids provided".to_string()));
    }
    tracing::debug!(service = %caller.service_name, count = user_ids.len(), "Service batch lookup");

    let users = state
        .auth_service
        .get_users(&user_ids)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        UsersResponseData {
            users: users.iter().map(UserData::from).collect(),
        },
    ))
}

fn parse_user_ids(raw: &str) -> Vec<UserId> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| match UserId::from_string(part) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(value = part, error = %e, "Skipping invalid user id");
                None
            }
        })
        .collect()
}

pub async fn get_user_role(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedService>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<UserRoleResponseData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(AuthError::from)?;
    tracing::debug!(service = %caller.service_name, user_id = %user_id, "Service role lookup");

    let role = state
        .auth_service
        .get_user_role(user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        UserRoleResponseData {
            user_id: user_id.as_i64(),
            role: role.as_str().to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRoleResponseData {
    pub user_id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchUsersQuery {
    pub ids: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsersResponseData {
    pub users: Vec<UserData>,
}
