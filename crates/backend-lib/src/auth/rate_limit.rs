// ============================
// chirpy-backend-lib/src/auth/rate_limit.rs
// ============================
//! Lockout of repeated failed logins, keyed by account email.
//!
//! An attempt is counted when it is acquired, before the password is checked,
//! so concurrent guesses cannot slip past the limit while verification runs.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::metrics::LOGIN_LOCKOUT;

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
pub const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// How often the background task drops stale entries
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Attempts counted against the account, including ones still in flight
    failed_attempts: u32,
    /// Time of the last counted attempt
    last_attempt: Instant,
    /// When the lockout expires, if locked out
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    attempts: Arc<DashMap<String, RateLimitEntry>>,
    max_attempts: u32,
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_LOCKOUT_DURATION)
    }
}

fn key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Count a login attempt for `email` before verifying it.
    ///
    /// Returns `false` while the account is locked out. The attempt stays
    /// counted as a failure until [`record_success`](Self::record_success) or
    /// [`release`](Self::release) is called.
    pub fn try_acquire(&self, email: &str) -> bool {
        self.try_acquire_at(email, Instant::now())
    }

    fn try_acquire_at(&self, email: &str, now: Instant) -> bool {
        let mut entry = self.attempts.entry(key(email)).or_insert_with(|| RateLimitEntry {
            failed_attempts: 0,
            last_attempt: now,
            lockout_expiry: None,
        });

        match entry.lockout_expiry {
            Some(expiry) if now < expiry => return false,
            // a lapsed lockout starts a fresh count
            Some(_) => {
                entry.failed_attempts = 0;
                entry.lockout_expiry = None;
            }
            None if now.duration_since(entry.last_attempt) >= self.lockout_duration => {
                entry.failed_attempts = 0;
            }
            None => {}
        }

        entry.failed_attempts += 1;
        entry.last_attempt = now;

        if entry.failed_attempts >= self.max_attempts {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            metrics::counter!(LOGIN_LOCKOUT).increment(1);
            tracing::warn!(
                attempts = entry.failed_attempts,
                lockout_secs = self.lockout_duration.as_secs(),
                "account locked out after repeated login failures"
            );
        }
        true
    }

    /// Forget failures after a successful login
    pub fn record_success(&self, email: &str) {
        self.attempts.remove(&key(email));
    }

    /// Uncount an acquired attempt that ended without a password verdict
    pub fn release(&self, email: &str) {
        if let Some(mut entry) = self.attempts.get_mut(&key(email)) {
            entry.failed_attempts = entry.failed_attempts.saturating_sub(1);
            if entry.failed_attempts < self.max_attempts {
                entry.lockout_expiry = None;
            }
        }
    }

    /// Number of tracked accounts
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Drop lapsed lockouts and failure counts older than the lockout window
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    fn cleanup_at(&self, now: Instant) {
        let before = self.attempts.len();
        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_attempt) < self.lockout_duration,
        });

        let removed = before.saturating_sub(self.attempts.len());
        if removed > 0 {
            tracing::debug!(removed, "cleaned up login attempt entries");
        }
    }

    /// Run [`cleanup`](Self::cleanup) every `interval` on the current runtime
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                limiter.cleanup();
            }
        })
    }
}
