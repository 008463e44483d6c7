// ============================
// chirpy-backend-lib/src/auth/refresh_token.rs
// ============================
//! Opaque, server-side refresh tokens with revocation.
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{token_generator::generate_secure_token, AuthError};
use crate::metrics::{REFRESH_TOKEN_ISSUED, REFRESH_TOKEN_REVOKED};

/// Refresh token TTL (time to live)
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7); // 7 days

/// Lifecycle state of a refresh token at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    /// Derived from the clock, never stored
    Expired,
    /// Terminal
    Revoked,
}

/// Persisted refresh token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
    pub subject: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked_at.is_some() {
            TokenState::Revoked
        } else if now > self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }
}

/// Result of a conditional revoke against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    AlreadyRevoked,
    NotFound,
}

/// Key-value capability backing the refresh token table.
///
/// Implementations must make `put` a unique insert and `revoke_if_active` a
/// single atomic conditional update, so that a concurrent `get` observes either
/// the active or the revoked record and never a partial write.
#[async_trait]
pub trait RefreshTokenBackend: Send + Sync {
    /// Insert a new record; `DuplicateToken` if the key exists
    async fn put(&self, record: RefreshToken) -> Result<(), AuthError>;

    /// Fetch a record by token
    async fn get(&self, token: &str) -> Result<Option<RefreshToken>, AuthError>;

    /// Set `revoked_at = at` unless it is already set
    async fn revoke_if_active(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, AuthError>;
}

/// In-memory backend; each key is updated under its shard lock
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefreshTokens {
    tokens: Arc<DashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl RefreshTokenBackend for InMemoryRefreshTokens {
    async fn put(&self, record: RefreshToken) -> Result<(), AuthError> {
        match self.tokens.entry(record.token.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateToken),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn get(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(self.tokens.get(token).map(|r| r.value().clone()))
    }

    async fn revoke_if_active(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<RevokeOutcome, AuthError> {
        let Some(mut record) = self.tokens.get_mut(token) else {
            return Ok(RevokeOutcome::NotFound);
        };
        if record.revoked_at.is_some() {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        record.revoked_at = Some(at);
        Ok(RevokeOutcome::Revoked)
    }
}

/// Issues, resolves and revokes refresh tokens over a backend
#[derive(Clone)]
pub struct RefreshTokenStore {
    backend: Arc<dyn RefreshTokenBackend>,
    default_ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(backend: Arc<dyn RefreshTokenBackend>) -> Self {
        Self::with_ttl(backend, REFRESH_TOKEN_TTL)
    }

    pub fn with_ttl(backend: Arc<dyn RefreshTokenBackend>, default_ttl: Duration) -> Self {
        Self {
            backend,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// 256 random bits, hex encoded
    pub fn generate(&self) -> Result<String, AuthError> {
        generate_secure_token()
    }

    /// Issue a token with the default TTL
    pub async fn issue(&self, subject: Uuid) -> Result<RefreshToken, AuthError> {
        self.issue_at(subject, self.default_ttl, Utc::now()).await
    }

    /// Issue and persist a token for `subject` valid for `ttl` from `now`
    pub async fn issue_at(
        &self,
        subject: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<RefreshToken, AuthError> {
        if ttl.is_zero() {
            return Err(AuthError::InvalidTtl);
        }
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| AuthError::InvalidTtl)?;
        let expires_at = now.checked_add_signed(ttl).ok_or(AuthError::InvalidTtl)?;

        let record = RefreshToken {
            token: self.generate()?,
            subject,
            issued_at: now,
            expires_at,
            revoked_at: None,
        };
        self.backend.put(record.clone()).await?;

        metrics::counter!(REFRESH_TOKEN_ISSUED).increment(1);
        tracing::debug!(%subject, %expires_at, "refresh token issued");
        Ok(record)
    }

    /// Resolve a token to its owner
    pub async fn resolve(&self, token: &str) -> Result<Uuid, AuthError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve as if the current time were `now`.
    ///
    /// Checks run in order: not found, revoked, expired. Nothing is written.
    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let record = self
            .backend
            .get(token)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)?;

        match record.state_at(now) {
            TokenState::Revoked => Err(AuthError::RefreshTokenRevoked),
            TokenState::Expired => Err(AuthError::RefreshTokenExpired),
            TokenState::Active => Ok(record.subject),
        }
    }

    /// Revoke a token. Revoking an already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.revoke_at(token, Utc::now()).await
    }

    pub async fn revoke_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        match self.backend.revoke_if_active(token, now).await? {
            RevokeOutcome::NotFound => Err(AuthError::RefreshTokenNotFound),
            RevokeOutcome::AlreadyRevoked => Ok(()),
            RevokeOutcome::Revoked => {
                metrics::counter!(REFRESH_TOKEN_REVOKED).increment(1);
                tracing::debug!("refresh token revoked");
                Ok(())
            }
        }
    }
}
