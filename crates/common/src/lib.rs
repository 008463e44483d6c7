// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between Chirpy clients and the server.
//! This module defines the JSON bodies of the authentication endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a user, owned by the user directory
pub type UserId = Uuid;

/// Body of `POST /api/users`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserRequest {
    /// Login email, unique per user
    pub email: String,
    /// Plaintext password, hashed before it is stored
    pub password: String,
}

/// Response to a successful registration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
}

/// Body of `POST /api/login`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response to a successful login
/// # Fields
/// * `id` - Identity of the authenticated user
/// * `email` - Email the user logged in with
/// * `token` - Short-lived signed access token
/// * `refresh_token` - Long-lived opaque refresh token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub id: UserId,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

/// Response to `POST /api/refresh`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RefreshResponse {
    /// Newly minted access token
    pub token: String,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Stable error code plus a human readable message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
