use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::models::Role;
use crate::domain::auth::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::INVALID_TOKEN;
use crate::inbound::http::router::AppState;

pub const SERVICE_NAME_HEADER: &str = "x-service-name";
pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// Extension type to store the authenticated principal in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

/// Extension type for callers that passed the service-key check
#[derive(Debug, Clone)]
pub struct AuthenticatedService {
    pub service_name: String,
}

/// Middleware that validates the bearer access token and adds the principal
/// to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let principal = state
        .auth_service
        .validate_access_token(token)
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            ApiError::from_token(e)
        })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id: principal.user_id,
        role: principal.role,
    });

    Ok(next.run(req).await)
}

/// Role gate; must run inside [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    require_any_role(&req, &[Role::ADMIN])?;
    Ok(next.run(req).await)
}

/// Reject with 403 unless the authenticated principal holds one of `allowed`.
pub fn require_any_role(req: &Request, allowed: &[&str]) -> Result<(), ApiError> {
    let user = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::Unauthorized(INVALID_TOKEN.to_string()))?;

    if !allowed.contains(&user.role.as_str()) {
        tracing::warn!(user_id = %user.user_id, role = %user.role, "Insufficient role");
        return Err(ApiError::Forbidden("insufficient role".to_string()));
    }

    Ok(())
}

/// Middleware for service-to-service routes keyed by `X-Service-Name` and
/// `X-Service-Key`
pub async fn require_service_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Scoped so the closure's borrow of `req` ends before the await below.
    let (service_name, service_key) = {
        let header_value = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        (
            header_value(SERVICE_NAME_HEADER),
            header_value(SERVICE_KEY_HEADER),
        )
    };

    let (Some(service_name), Some(service_key)) = (service_name, service_key) else {
        return Err(ApiError::Unauthorized(
            "missing service credentials".to_string(),
        ));
    };

    state
        .auth_service
        .validate_service_key(&service_name, &service_key)
        .await
        .map_err(ApiError::from)?;

    req.extensions_mut()
        .insert(AuthenticatedService { service_name });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized(
                "invalid Authorization header format, expected: Bearer <token>".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_role_gate() {
        let mut req = Request::new(Body::empty());
        assert!(matches!(
            require_any_role(&req, &[Role::ADMIN]),
            Err(ApiError::Unauthorized(_))
        ));

        req.extensions_mut().insert(AuthenticatedUser {
            user_id: UserId(1),
            role: Role::user(),
        });
        assert!(matches!(
            require_any_role(&req, &[Role::ADMIN]),
            Err(ApiError::Forbidden(_))
        ));
        assert!(require_any_role(&req, &[Role::ADMIN, Role::USER]).is_ok());
    }
}
