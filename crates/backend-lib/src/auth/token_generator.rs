// ============================
// chirpy-backend-lib/src/auth/token_generator.rs
// ============================
//! Secure token generation for authentication.
//!
//! Cryptographically secure opaque tokens for refresh tokens and
//! access-token identifiers.
use rand::{rngs::OsRng, TryRngCore};

use super::AuthError;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/** Generate a cryptographically secure random token
This uses OS-provided entropy to create a token suitable for refresh tokens.
# Returns
A lowercase hex string of 64 characters */
pub fn generate_secure_token() -> Result<String, AuthError> {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
The hex encoding of the random bytes (`2 * bytes` characters) */
pub fn generate_secure_token_with_size(bytes: usize) -> Result<String, AuthError> {
    let mut buffer = vec![0u8; bytes];
    OsRng
        .try_fill_bytes(&mut buffer)
        .map_err(|e| AuthError::HashingFailure(format!("entropy source: {e}")))?;
    Ok(hex::encode(buffer))
}
