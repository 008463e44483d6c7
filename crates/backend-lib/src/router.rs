// ============================
// chirpy-backend-lib/src/router.rs
// ============================
//! HTTP router for the authentication endpoints.
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::auth::{create_user, healthz, login, refresh, revoke};
use crate::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
