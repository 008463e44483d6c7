// ============================
// chirpy-backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use rand::{rngs::OsRng, TryRngCore};
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::AuthError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Salt size in bytes
const SALT_BYTES: usize = 16;

/// Password complexity requirements
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// scrypt work factor. `log_n` is the CPU/memory cost exponent.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PasswordCost {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

impl Default for PasswordCost {
    fn default() -> Self {
        Self {
            log_n: Params::RECOMMENDED_LOG_N,
            r: Params::RECOMMENDED_R,
            p: Params::RECOMMENDED_P,
        }
    }
}

impl PasswordCost {
    fn params(&self) -> Result<Params, AuthError> {
        Params::new(self.log_n, self.r, self.p, Params::RECOMMENDED_LEN)
            .map_err(|e| AuthError::HashingFailure(format!("invalid scrypt cost: {e}")))
    }

    /// Check the cost without hashing anything
    pub fn validate(&self) -> Result<(), AuthError> {
        self.params().map(|_| ())
    }
}

/// Stored form of a password: a PHC string carrying algorithm, cost, salt and digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHashRecord(String);

impl PasswordHashRecord {
    /// Wrap a previously stored PHC string
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Salted, deliberately slow one-way hashing of credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    cost: PasswordCost,
}

impl PasswordHasher {
    pub fn new(cost: PasswordCost) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> PasswordCost {
        self.cost
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<PasswordHashRecord, AuthError> {
        let params = self.cost.params()?;

        let mut salt_bytes = [0u8; SALT_BYTES];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| AuthError::HashingFailure(format!("entropy source: {e}")))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?;

        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?;

        Ok(PasswordHashRecord(hash.to_string()))
    }

    /// Hash a password and zeroize the original
    pub fn hash_and_zeroize(&self, plain: &mut String) -> Result<PasswordHashRecord, AuthError> {
        let record = self.hash(plain);
        plain.zeroize();
        record
    }

    /// Verify a password against a stored record.
    ///
    /// The digest comparison is constant time. A record that does not parse
    /// is reported as a mismatch.
    pub fn verify(&self, plain: &str, record: &PasswordHashRecord) -> Result<(), AuthError> {
        let parsed = match PasswordHash::new(record.as_str()) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is unreadable");
                return Err(AuthError::PasswordMismatch);
            }
        };

        Scrypt
            .verify_password(plain.as_bytes(), &parsed)
            .map_err(|_| AuthError::PasswordMismatch)
    }
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.chars().count() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}
