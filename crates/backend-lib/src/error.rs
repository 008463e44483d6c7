// ============================
// chirpy-backend-lib/src/error.rs
// ============================
//! HTTP-facing error type.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chirpy_common::{ErrorDetail, ErrorResponse};
use thiserror::Error;

use crate::auth::AuthError;

/// Errors a handler can return; each maps to one status and error code
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Too many failed logins for this account")]
    LoginLockedOut,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::TokenEncoding(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::LoginLockedOut => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(e) => e.error_code(),
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::LoginLockedOut => "AUTH_003",
        }
    }

    /// Message for release builds. Every non-retryable auth failure reads the
    /// same so responses do not tell callers which check failed.
    pub fn sanitized_message(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::TokenEncoding(_)) => "An internal server error occurred",
            AppError::Auth(e) if e.is_retryable() => "Service temporarily unavailable, please retry",
            AppError::Auth(_) => "Authentication failed",
            AppError::Conflict(_) => "Resource already exists",
            AppError::InvalidInput(_) => "Invalid input provided",
            AppError::LoginLockedOut => "Too many authentication attempts, please try again later",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message().to_string()
        };
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
