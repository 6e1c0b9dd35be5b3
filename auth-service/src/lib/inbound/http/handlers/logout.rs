use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::ApiError;
use crate::inbound::http::middleware::bearer_token;
use crate::inbound::http::router::AppState;

/// Revoke the session whose refresh token is presented as the bearer token.
/// Unknown or already revoked tokens still answer 204.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers)?;

    state
        .auth_service
        .logout(refresh_token)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
