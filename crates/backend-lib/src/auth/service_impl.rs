// ============================
// chirpy-backend-lib/src/auth/service_impl.rs
// ============================
//! Default `AuthService` backed by the session coordinator.
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::auth::{
    verify_api_key, AuthError, AuthService, CredentialExtractor, LoginOutcome,
    PasswordHashRecord, SessionCoordinator,
};

pub struct DefaultAuth {
    sessions: SessionCoordinator,
    extractor: CredentialExtractor,
    /// Expected service API key; `None` rejects every service call
    api_key: Option<Zeroizing<String>>,
}

impl DefaultAuth {
    pub fn new(sessions: SessionCoordinator, extractor: CredentialExtractor) -> Self {
        Self {
            sessions,
            extractor,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Zeroizing::new(api_key.into()));
        self
    }

    pub fn sessions(&self) -> &SessionCoordinator {
        &self.sessions
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn hash_password(&self, plain: String) -> Result<PasswordHashRecord, AuthError> {
        self.sessions.hash_password(plain).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        self.sessions.login(email, password).await
    }

    async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        self.sessions.refresh(headers).await
    }

    async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        self.sessions.revoke(headers).await
    }

    fn authenticate_request(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        self.sessions.authenticate_request(headers)
    }

    fn authenticate_service(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let presented = self.extractor.api_key(headers)?;
        match &self.api_key {
            Some(expected) => verify_api_key(&presented, expected),
            None => Err(AuthError::ApiKeyInvalid),
        }
    }
}
