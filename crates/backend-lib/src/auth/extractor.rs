// ============================
// chirpy-backend-lib/src/auth/extractor.rs
// ============================
//! Pulling credentials out of request headers.
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName};
use subtle::ConstantTimeEq;

use super::AuthError;

/// Prefix of `Authorization` values carrying a bearer token
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default prefix for service API keys (`Authorization: ApiKey <key>`)
pub const DEFAULT_API_KEY_PREFIX: &str = "ApiKey ";

/// Read `header`, require the exact (case-sensitive) `prefix` and return the
/// trimmed remainder.
fn extract_prefixed(
    headers: &HeaderMap,
    header: &HeaderName,
    prefix: &str,
) -> Result<String, AuthError> {
    let value = headers.get(header).ok_or(AuthError::HeaderMissing)?;
    let value = value.to_str().map_err(|_| AuthError::HeaderMalformed)?;

    let rest = value
        .strip_prefix(prefix)
        .ok_or(AuthError::HeaderMalformed)?
        .trim();

    if rest.is_empty() {
        return Err(AuthError::TokenEmpty);
    }
    Ok(rest.to_string())
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_prefixed(headers, &AUTHORIZATION, BEARER_PREFIX)
}

/// Parses credentials using the configured API key convention
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    api_key_header: HeaderName,
    api_key_prefix: String,
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        Self {
            api_key_header: AUTHORIZATION,
            api_key_prefix: DEFAULT_API_KEY_PREFIX.to_string(),
        }
    }
}

impl CredentialExtractor {
    pub fn new(api_key_header: HeaderName, api_key_prefix: impl Into<String>) -> Self {
        Self {
            api_key_header,
            api_key_prefix: api_key_prefix.into(),
        }
    }

    pub fn bearer(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        extract_bearer(headers)
    }

    /// Extract a service API key. Same failure taxonomy as [`extract_bearer`].
    pub fn api_key(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        extract_prefixed(headers, &self.api_key_header, &self.api_key_prefix)
    }
}

/// Constant-time comparison of a presented API key against the configured one
pub fn verify_api_key(presented: &str, expected: &str) -> Result<(), AuthError> {
    if bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthError::ApiKeyInvalid)
    }
}
