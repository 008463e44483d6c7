// ============================
// chirpy-backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod access_token;
pub mod error;
pub mod extractor;
pub mod password;
pub mod rate_limit;
pub mod refresh_token;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use access_token::{AccessClaims, AccessTokenCodec, ACCESS_TOKEN_TTL, DEFAULT_ISSUER};
pub use error::AuthError;
pub use extractor::{extract_bearer, verify_api_key, CredentialExtractor};
pub use password::{
    validate_password_strength, PasswordCost, PasswordHashRecord, PasswordHasher,
    PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::AuthRateLimiter;
pub use refresh_token::{
    InMemoryRefreshTokens, RefreshToken, RefreshTokenBackend, RefreshTokenStore, RevokeOutcome,
    TokenState, REFRESH_TOKEN_TTL,
};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use session::{LoginOutcome, SessionCoordinator};
