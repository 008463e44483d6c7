// ============================
// chirpy-backend-lib/src/auth/access_token.rs
// ============================
//! Short-lived signed access tokens (HS256 JWTs).
//!
//! Only [`Algorithm::HS256`] is accepted; the `alg` of an incoming header is
//! checked against that allow-list and never used to pick a verifier.
use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{token_generator::generate_secure_token_with_size, AuthError};
use crate::metrics::{ACCESS_TOKEN_ISSUED, ACCESS_TOKEN_REJECTED};

/// The only accepted signing algorithm
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Default issuer claim
pub const DEFAULT_ISSUER: &str = "chirpy";

/// Default access token lifetime (1 hour)
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Bytes of randomness in the `jti` claim
const TOKEN_ID_BYTES: usize = 16;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token identifier
    pub jti: String,
}

/// Issues and validates access tokens with a secret bound at construction
#[derive(Clone)]
pub struct AccessTokenCodec {
    secret: Zeroizing<Vec<u8>>,
    issuer: String,
}

impl fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .finish()
    }
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::SignatureInvalid,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenMalformed,
    }
}

impl AccessTokenCodec {
    pub fn new(secret: impl AsRef<[u8]>, issuer: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.as_ref().to_vec()),
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token for `subject` valid for exactly `ttl`
    pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject: Uuid,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if ttl.is_zero() {
            return Err(AuthError::InvalidTtl);
        }
        let ttl = chrono::Duration::from_std(ttl).map_err(|_| AuthError::InvalidTtl)?;
        let expires_at = now.checked_add_signed(ttl).ok_or(AuthError::InvalidTtl)?;

        let claims = AccessClaims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: generate_secure_token_with_size(TOKEN_ID_BYTES)?,
        };

        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AuthError::TokenEncoding(e.to_string()))?;

        metrics::counter!(ACCESS_TOKEN_ISSUED).increment(1);
        tracing::debug!(%subject, exp = claims.exp, "access token issued");

        Ok(token)
    }

    /// Validate a token and return its subject
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let result = self.decode_at(token, now).and_then(|claims| {
            claims
                .sub
                .parse::<Uuid>()
                .map_err(|_| AuthError::TokenMalformed)
        });

        if let Err(e) = &result {
            metrics::counter!(ACCESS_TOKEN_REJECTED).increment(1);
            tracing::warn!(reason = %e, "access token rejected");
        }
        result
    }

    /// Verify a token and return all of its claims.
    ///
    /// Structure, algorithm and signature are checked before any claim; expiry
    /// is checked last, against `now` instead of the system clock.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(|e| map_decode_error(e.kind()))?
        .claims;

        if now.timestamp() > claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }
}
