// ============================
// chirpy-backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.

pub mod auth;
