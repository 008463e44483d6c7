// ============================
// chirpy-backend-lib/src/handlers/auth.rs
// ============================
//! Registration and session endpoints.
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chirpy_common::{
    CreateUserRequest, LoginRequest, LoginResponse, RefreshResponse, UserResponse,
};

use crate::{
    auth::{validate_password_strength, AuthError},
    error::AppError,
    AppState,
};

/// `POST /api/users`
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("email is not valid".into()));
    }
    if !validate_password_strength(&body.password, &state.settings.password_requirements) {
        return Err(AppError::InvalidInput(
            "password does not meet the complexity requirements".into(),
        ));
    }

    let hash = state.auth.hash_password(body.password).await?;
    let user = state.users.create(email, hash).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if !state.login_limiter.try_acquire(&body.email) {
        return Err(AppError::LoginLockedOut);
    }

    match state.auth.login(&body.email, &body.password).await {
        Ok(outcome) => {
            state.login_limiter.record_success(&body.email);
            Ok(Json(LoginResponse {
                id: outcome.user_id,
                email: outcome.email,
                token: outcome.access_token,
                refresh_token: outcome.refresh_token.token,
            }))
        },
        // the acquired attempt already counts as the failure
        Err(AuthError::PasswordMismatch) => Err(AuthError::PasswordMismatch.into()),
        Err(e) => {
            state.login_limiter.release(&body.email);
            Err(e.into())
        },
    }
}

/// `POST /api/refresh` with `Authorization: Bearer <refresh token>`
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AppError> {
    let token = state.auth.refresh(&headers).await?;
    Ok(Json(RefreshResponse { token }))
}

/// `POST /api/revoke` with `Authorization: Bearer <refresh token>`
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    state.auth.revoke(&headers).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/healthz`
pub async fn healthz() -> &'static str {
    "OK"
}
