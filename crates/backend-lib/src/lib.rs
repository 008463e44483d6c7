// ============================
// chirpy-backend-lib/src/lib.rs
// ============================
//! Authentication and token lifecycle for the Chirpy API.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod users;

use std::sync::Arc;

use anyhow::Context;

use crate::auth::{
    AccessTokenCodec, AuthRateLimiter, AuthService, CredentialExtractor, DefaultAuth,
    InMemoryRefreshTokens, PasswordHasher, RefreshTokenBackend, RefreshTokenStore,
    SessionCoordinator,
};
use crate::config::Settings;
use crate::users::{InMemoryUserDirectory, UserDirectory};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// User directory
    pub users: Arc<dyn UserDirectory>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Failed login lockout
    pub login_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    /// Create a new application state from validated settings and injected stores
    pub fn new(
        settings: Settings,
        users: Arc<dyn UserDirectory>,
        refresh_backend: Arc<dyn RefreshTokenBackend>,
    ) -> anyhow::Result<Self> {
        settings.validate()?;
        let auth_settings = &settings.auth;

        let hasher = PasswordHasher::new(auth_settings.password_cost);
        let codec = AccessTokenCodec::new(
            auth_settings.token_secret.as_bytes(),
            auth_settings.issuer.clone(),
        );
        let refresh_tokens =
            RefreshTokenStore::with_ttl(refresh_backend, auth_settings.refresh_token_ttl());
        let sessions = SessionCoordinator::new(hasher, codec, refresh_tokens, users.clone())
            .context("failed to initialise session coordinator")?
            .with_access_ttl(auth_settings.access_token_ttl());

        let extractor = CredentialExtractor::new(
            auth_settings.api_key_header_name()?,
            auth_settings.api_key_prefix.clone(),
        );
        let mut auth = DefaultAuth::new(sessions, extractor);
        if let Some(api_key) = &auth_settings.api_key {
            auth = auth.with_api_key(api_key.clone());
        }

        let login_limiter = Arc::new(AuthRateLimiter::new(
            auth_settings.login_max_attempts,
            auth_settings.login_lockout(),
        ));

        Ok(Self {
            auth: Arc::new(auth),
            users,
            settings: Arc::new(settings),
            login_limiter,
        })
    }

    /// Create a new application state backed by in-memory stores
    pub fn in_memory(settings: Settings) -> anyhow::Result<Self> {
        Self::new(
            settings,
            Arc::new(InMemoryUserDirectory::new()),
            Arc::new(InMemoryRefreshTokens::new()),
        )
    }
}
