use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::admin::set_user_status;
use super::handlers::change_password::change_password;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::logout_all::logout_all;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::service::get_user;
use super::handlers::service::get_user_role;
use super::handlers::service::get_users;
use super::handlers::validate::validate;
use super::middleware::authenticate;
use super::middleware::require_admin;
use super::middleware::require_service_key;
use crate::domain::auth::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>, request_timeout: Duration) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout));

    let protected_routes = Router::new()
        .route("/auth/logout-all", post(logout_all))
        .route("/auth/password", put(change_password))
        .route("/auth/validate", get(validate))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    // Layers run outermost-last: authenticate, then the role gate
    let admin_routes = Router::new()
        .route("/admin/users/:user_id/status", put(set_user_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let service_routes = Router::new()
        .route("/service/users/batch", get(get_users))
        .route("/service/users/:user_id", get(get_user))
        .route("/service/users/:user_id/role", get(get_user_role))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_service_key,
        ));

    // Headers are left out of the span; they carry bearer tokens and keys.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .merge(service_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
