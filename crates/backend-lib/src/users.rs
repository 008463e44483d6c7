// ============================
// chirpy-backend-lib/src/users.rs
// ============================
//! User directory abstraction with an in-memory implementation.
//!
//! Account management proper lives outside the authentication core; login
//! only needs to find a user's identity and stored password hash by email.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use crate::auth::PasswordHashRecord;
use crate::error::AppError;

/// A registered user as seen by the authentication flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: PasswordHashRecord,
    pub created_at: DateTime<Utc>,
}

/// Trait for user directory backends
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create a user; `Conflict` if the email is taken
    async fn create(
        &self,
        email: &str,
        password_hash: PasswordHashRecord,
    ) -> Result<UserRecord, AppError>;

    /// Look a user up by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError>;
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory user directory keyed by normalized email
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<DashMap<String, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(
        &self,
        email: &str,
        password_hash: PasswordHashRecord,
    ) -> Result<UserRecord, AppError> {
        let key = normalize_email(email);
        match self.users.entry(key.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict("email already registered".into())),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    id: Uuid::new_v4(),
                    email: key,
                    password_hash,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self
            .users
            .get(&normalize_email(email))
            .map(|u| u.value().clone()))
    }
}
