use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthSessionData;
use super::INVALID_CREDENTIALS;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::LoginCommand;
use crate::inbound::http::provenance::ClientProvenance;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    ClientProvenance(provenance): ClientProvenance,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthSessionData>, ApiError> {
    let Json(body) = body?;

    // A malformed e-mail cannot belong to any account
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let command = LoginCommand {
        email,
        password: body.password,
    };

    state
        .auth_service
        .login(command, provenance)
        .await
        .map_err(ApiError::from_login)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
