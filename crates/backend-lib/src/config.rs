// ============================
// chirpy-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use axum::http::HeaderName;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::{
    access_token::DEFAULT_ISSUER,
    extractor::DEFAULT_API_KEY_PREFIX,
    rate_limit::{DEFAULT_LOCKOUT_DURATION, DEFAULT_MAX_ATTEMPTS},
    PasswordCost, PasswordRequirements, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL,
};

/// Prefix of environment overrides, e.g. `CHIRPY_AUTH__TOKEN_SECRET`
pub const ENV_PREFIX: &str = "CHIRPY_";

/// Minimum signing secret length in bytes
pub const MIN_SECRET_BYTES: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub password_requirements: PasswordRequirements,
    pub log: LogSettings,
}

/// Server bind settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Token and credential settings
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC signing secret for access tokens; keep it out of source control
    pub token_secret: String,
    /// `iss` claim of issued access tokens
    pub issuer: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// Header carrying service API keys
    pub api_key_header: String,
    /// Prefix in front of the API key inside that header
    pub api_key_prefix: String,
    /// Expected webhook API key; service calls are refused when unset
    pub api_key: Option<String>,
    pub password_cost: PasswordCost,
    /// Failed logins before an account is locked out
    pub login_max_attempts: u32,
    pub login_lockout_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_token_ttl_secs: ACCESS_TOKEN_TTL.as_secs(),
            refresh_token_ttl_secs: REFRESH_TOKEN_TTL.as_secs(),
            api_key_header: "authorization".to_string(),
            api_key_prefix: DEFAULT_API_KEY_PREFIX.to_string(),
            api_key: None,
            password_cost: PasswordCost::default(),
            login_max_attempts: DEFAULT_MAX_ATTEMPTS,
            login_lockout_secs: DEFAULT_LOCKOUT_DURATION.as_secs(),
        }
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("api_key_header", &self.api_key_header)
            .field("api_key_prefix", &self.api_key_prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("password_cost", &self.password_cost)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_lockout_secs", &self.login_lockout_secs)
            .finish()
    }
}

impl AuthSettings {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_ttl_secs)
    }

    pub fn login_lockout(&self) -> Duration {
        Duration::from_secs(self.login_lockout_secs)
    }

    pub fn api_key_header_name(&self) -> Result<HeaderName> {
        HeaderName::try_from(self.api_key_header.as_str())
            .with_context(|| format!("invalid api_key_header {:?}", self.api_key_header))
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Defaults, then `config.toml`, then `CHIRPY_` environment variables
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment().merge(Toml::file("config.toml")))
    }

    /// Same as [`Settings::load`] but reading the given TOML file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        Self::extract(Self::figment().merge(Toml::file(path)))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load settings")?;
        Ok(settings)
    }

    /// Server bind address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.server.host, self.server.port))
    }

    /// Reject settings the server cannot safely run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_secret.len() < MIN_SECRET_BYTES {
            bail!("auth.token_secret must be at least {MIN_SECRET_BYTES} bytes");
        }
        if self.auth.issuer.trim().is_empty() {
            bail!("auth.issuer must not be empty");
        }
        if self.auth.access_token_ttl_secs == 0 || self.auth.refresh_token_ttl_secs == 0 {
            bail!("token TTLs must be positive");
        }
        if self.auth.login_max_attempts == 0 {
            bail!("auth.login_max_attempts must be positive");
        }
        self.auth.api_key_header_name()?;
        self.auth
            .password_cost
            .validate()
            .context("auth.password_cost")?;
        if self.password_requirements.min_length < 8 {
            bail!("password_requirements.min_length must be at least 8");
        }
        if !LOG_LEVELS.contains(&self.log.level.as_str()) {
            bail!("unknown log level {:?}", self.log.level);
        }
        self.bind_addr()?;
        Ok(())
    }
}
