// ============================
// chirpy-backend-lib/src/middleware/auth.rs
// ============================
//! Request authentication for the resource routes.
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{auth::AuthError, error::AppError, AppState};

/// Identity attached to a request by [`require_identity`].
///
/// Ownership checks (only the author may delete a chirp, ...) are up to the
/// handler using it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// Validate the bearer access token and attach the caller's identity
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = state.auth.authenticate_request(request.headers())?;
    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

/// Require a valid service API key (webhook callers)
pub async fn require_service_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.auth.authenticate_service(request.headers())?;
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::Auth(AuthError::HeaderMissing))
    }
}
