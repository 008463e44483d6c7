// ============================
// chirpy-backend-lib/src/auth/session.rs
// ============================
//! Login, refresh, revoke and request authentication flows.
use std::{sync::Arc, time::Duration};

use axum::http::HeaderMap;
use tracing::instrument;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{
    access_token::{AccessTokenCodec, ACCESS_TOKEN_TTL},
    extractor::extract_bearer,
    password::{PasswordHashRecord, PasswordHasher},
    refresh_token::{RefreshToken, RefreshTokenStore},
    token_generator::generate_secure_token,
    AuthError,
};
use crate::metrics::{LOGIN_FAILURE, LOGIN_SUCCESS};
use crate::users::UserDirectory;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

/// Composes hashing, token codecs and the refresh token store into session flows
#[derive(Clone)]
pub struct SessionCoordinator {
    hasher: PasswordHasher,
    codec: AccessTokenCodec,
    refresh_tokens: RefreshTokenStore,
    users: Arc<dyn UserDirectory>,
    access_ttl: Duration,
    /// Verified against when the email is unknown so both paths cost the same
    decoy_hash: PasswordHashRecord,
}

impl SessionCoordinator {
    /// Create a coordinator. Hashes one random decoy password up front.
    pub fn new(
        hasher: PasswordHasher,
        codec: AccessTokenCodec,
        refresh_tokens: RefreshTokenStore,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, AuthError> {
        let decoy_hash = hasher.hash(&generate_secure_token()?)?;
        Ok(Self {
            hasher,
            codec,
            refresh_tokens,
            users,
            access_ttl: ACCESS_TOKEN_TTL,
            decoy_hash,
        })
    }

    /// Override the access token lifetime
    pub fn with_access_ttl(mut self, access_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self
    }

    pub fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenStore {
        &self.refresh_tokens
    }

    /// Hash a new password on the blocking pool
    pub async fn hash_password(&self, plain: String) -> Result<PasswordHashRecord, AuthError> {
        let hasher = self.hasher;
        let mut plain = plain;
        tokio::task::spawn_blocking(move || hasher.hash_and_zeroize(&mut plain))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("hashing task failed: {e}")))?
    }

    /// Verify credentials and mint an access token plus a refresh token.
    ///
    /// An unknown email and a wrong password both yield `PasswordMismatch`.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let record = user
            .as_ref()
            .map_or_else(|| self.decoy_hash.clone(), |u| u.password_hash.clone());
        let hasher = self.hasher;
        let plain = Zeroizing::new(password.to_string());
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&plain, &record))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("verify task failed: {e}")))?;

        let user = match verified.and_then(|()| user.ok_or(AuthError::PasswordMismatch)) {
            Ok(user) => user,
            Err(e) => {
                metrics::counter!(LOGIN_FAILURE).increment(1);
                tracing::info!(reason = %e, "login rejected");
                return Err(e);
            }
        };

        let access_token = self.codec.issue(user.id, self.access_ttl)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        metrics::counter!(LOGIN_SUCCESS).increment(1);
        tracing::info!(user_id = %user.id, "login succeeded");

        Ok(LoginOutcome {
            user_id: user.id,
            email: user.email,
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a new access token. The refresh
    /// token itself is not rotated.
    #[instrument(skip_all)]
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = extract_bearer(headers)?;
        let subject = self.refresh_tokens.resolve(&token).await?;
        self.codec.issue(subject, self.access_ttl)
    }

    /// Revoke the bearer refresh token. Outstanding access tokens stay valid
    /// until they expire.
    #[instrument(skip_all)]
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = extract_bearer(headers)?;
        self.refresh_tokens.revoke(&token).await
    }

    /// Resolve the identity behind a bearer access token
    pub fn authenticate_request(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer(headers)?;
        self.codec.validate(&token)
    }
}
