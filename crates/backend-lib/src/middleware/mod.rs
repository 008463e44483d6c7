// ============================
// chirpy-backend-lib/src/middleware/mod.rs
// ============================
//! Middleware for the Chirpy API.

pub mod auth;

pub use auth::{require_identity, require_service_key, AuthenticatedUser};
