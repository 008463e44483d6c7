// ============================
// chirpy-backend-lib/src/auth/error.rs
// ============================
//! Failure kinds of the authentication core.
//!
//! The core never picks an HTTP status. Callers map these kinds onto their
//! transport (see [`crate::error::AppError`]).
use thiserror::Error;

/// Every way an authentication operation can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header missing")]
    HeaderMissing,

    #[error("authorization header malformed")]
    HeaderMalformed,

    #[error("authorization header contains an empty token")]
    TokenEmpty,

    #[error("token malformed")]
    TokenMalformed,

    #[error("token expired")]
    TokenExpired,

    #[error("token signature invalid")]
    SignatureInvalid,

    #[error("token issuer not accepted")]
    IssuerMismatch,

    #[error("token lifetime must be positive and representable")]
    InvalidTtl,

    /// Also returned for unknown accounts so callers cannot enumerate users.
    #[error("invalid email or password")]
    PasswordMismatch,

    #[error("api key invalid")]
    ApiKeyInvalid,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token revoked")]
    RefreshTokenRevoked,

    #[error("refresh token expired")]
    RefreshTokenExpired,

    #[error("refresh token collides with an existing token")]
    DuplicateToken,

    #[error("hashing failure: {0}")]
    HashingFailure(String),

    #[error("token store failure: {0}")]
    Store(String),

    /// Claims could not be serialized or signed; not a caller error
    #[error("token encoding failure: {0}")]
    TokenEncoding(String),
}

impl AuthError {
    /// Infrastructure faults a caller may retry a bounded number of times.
    /// Everything else is permanent for the given input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::HashingFailure(_) | AuthError::DuplicateToken | AuthError::Store(_)
        )
    }

    /// Stable machine readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "AUTH_101",
            AuthError::HeaderMalformed => "AUTH_102",
            AuthError::TokenEmpty => "AUTH_103",
            AuthError::TokenMalformed => "AUTH_201",
            AuthError::TokenExpired => "AUTH_202",
            AuthError::SignatureInvalid => "AUTH_203",
            AuthError::IssuerMismatch => "AUTH_204",
            AuthError::InvalidTtl => "AUTH_205",
            AuthError::PasswordMismatch => "AUTH_301",
            AuthError::ApiKeyInvalid => "AUTH_302",
            AuthError::RefreshTokenNotFound => "AUTH_401",
            AuthError::RefreshTokenRevoked => "AUTH_402",
            AuthError::RefreshTokenExpired => "AUTH_403",
            AuthError::DuplicateToken => "AUTH_404",
            AuthError::HashingFailure(_) => "AUTH_501",
            AuthError::Store(_) => "AUTH_502",
            AuthError::TokenEncoding(_) => "AUTH_503",
        }
    }
}
