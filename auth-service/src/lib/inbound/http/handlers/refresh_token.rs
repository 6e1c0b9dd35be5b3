use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthSessionData;
use crate::inbound::http::provenance::ClientProvenance;
use crate::inbound::http::router::AppState;

pub async fn refresh_token(
    State(state): State<AppState>,
    ClientProvenance(provenance): ClientProvenance,
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthSessionData>, ApiError> {
    let Json(body) = body?;

    state
        .auth_service
        .refresh_token(&body.refresh_token, provenance)
        .await
        .map_err(ApiError::from_token)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    refresh_token: String,
}
