// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Throttling of failed login attempts, keyed by login identifier.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::validation::normalize_email;

/// Default number of failed attempts before lockout
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lockout duration (5 minutes)
pub const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(5 * 60);

/// Entries idle for this long are dropped by `cleanup`
const IDLE_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct AttemptEntry {
    failed_attempts: u32,
    last_failure: Instant,
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    attempts: Arc<DashMap<String, AttemptEntry>>,
    max_attempts: u32,
    lockout_duration: Duration,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    /// Emails are case-insensitive, usernames are not. Usernames never contain `@`.
    fn key(identifier: &str) -> String {
        let identifier = identifier.trim();
        if identifier.contains('@') {
            normalize_email(identifier)
        } else {
            identifier.to_string()
        }
    }

    /// Record a failed attempt. Returns `true` when this failure started a lockout.
    pub fn record_failure(&self, identifier: &str) -> bool {
        self.record_failure_at(identifier, Instant::now())
    }

    fn record_failure_at(&self, identifier: &str, now: Instant) -> bool {
        let mut entry = self
            .attempts
            .entry(Self::key(identifier))
            .or_insert_with(|| AttemptEntry {
                failed_attempts: 0,
                last_failure: now,
                lockout_expiry: None,
            });

        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            return true;
        }
        false
    }

    /// Forget failures after a successful login
    pub fn record_success(&self, identifier: &str) {
        self.attempts.remove(&Self::key(identifier));
    }

    /// Whether a login attempt for `identifier` may proceed
    pub fn is_allowed(&self, identifier: &str) -> bool {
        self.is_allowed_at(identifier, Instant::now())
    }

    fn is_allowed_at(&self, identifier: &str, now: Instant) -> bool {
        match self.attempts.get(&Self::key(identifier)) {
            Some(entry) => entry.lockout_expiry.is_none_or(|expiry| now >= expiry),
            None => true,
        }
    }

    /// Drop expired lockouts and long-idle entries
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < IDLE_RETENTION,
        });
    }

    /// Number of identifiers currently tracked
    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }
}
