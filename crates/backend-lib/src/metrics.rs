// ============================
// chirpy-backend-lib/src/metrics.rs
// ============================
//! Central place for Prometheus metric keys
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const LOGIN_LOCKOUT: &str = "auth.login.lockout";
pub const ACCESS_TOKEN_ISSUED: &str = "auth.access_token.issued";
pub const ACCESS_TOKEN_REJECTED: &str = "auth.access_token.rejected";
pub const REFRESH_TOKEN_ISSUED: &str = "auth.refresh_token.issued";
pub const REFRESH_TOKEN_REVOKED: &str = "auth.refresh_token.revoked";
