// ============================
// chirpy-backend-lib/src/auth/service.rs
// ============================
//! This module defines the `AuthService` trait, the interface the HTTP layer
//! uses to authenticate users and services
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

use super::{AuthError, LoginOutcome, PasswordHashRecord};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn hash_password(&self, plain: String) -> Result<PasswordHashRecord, AuthError>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;
    async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError>;
    async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError>;
    fn authenticate_request(&self, headers: &HeaderMap) -> Result<Uuid, AuthError>;

    /// Check a service-to-service API key (webhooks)
    fn authenticate_service(&self, headers: &HeaderMap) -> Result<(), AuthError>;
}
