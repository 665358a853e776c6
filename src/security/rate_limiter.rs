/// Per-key attempt limiter with temporary blocking
///
/// Keys are opaque client identifiers (IP address, user id). Each key has one
/// record holding an attempt counter for the current window and an optional
/// block deadline. Two profiles exist: `Auth` for login-style operations and
/// `Public` for unauthenticated endpoints, which gets a smaller budget and a
/// longer block.
use crate::config::{ ProfileConfig, RateLimitConfig };
use crate::core::constants::SYMBOL_WARNING;
use crate::core::{ Clock, SystemClock };
use crate::logger::{ self, LogTag };
use crate::utils::{ spawn_sweep, SweepHandle };
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitProfile {
    Auth,
    Public,
}

impl RateLimitProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitProfile::Auth => "auth",
            RateLimitProfile::Public => "public",
        }
    }
}

/// Attempt state for one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub attempts: u32,
    /// When the attempt counter falls back to zero (ms epoch)
    pub reset_at: i64,
    /// Set once attempts reach the threshold (ms epoch)
    pub blocked_until: Option<i64>,
}

impl RateLimitRecord {
    fn fresh(now: i64, profile: &ProfileConfig) -> Self {
        Self {
            attempts: 0,
            reset_at: now.saturating_add(profile.window_ms),
            blocked_until: None,
        }
    }

    fn is_blocked(&self, now: i64) -> bool {
        self.blocked_until.map(|until| now < until).unwrap_or(false)
    }

    /// Roll an expired block or window over to a clean record
    ///
    /// A passed block implies a full reset: the key starts over with zero
    /// attempts instead of keeping the count that triggered the block.
    fn roll_over(&mut self, now: i64, profile: &ProfileConfig) {
        let block_expired = self.blocked_until.map(|until| now >= until).unwrap_or(false);
        if block_expired || (self.blocked_until.is_none() && now >= self.reset_at) {
            *self = Self::fresh(now, profile);
        }
    }

    /// Both the window and any block are over
    fn is_expired(&self, now: i64) -> bool {
        now >= self.reset_at && !self.is_blocked(now)
    }
}

/// Read-only view of a key's limiter state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limited: bool,
    pub attempts: u32,
    pub remaining_attempts: u32,
    pub blocked_until: Option<i64>,
}

/// A key crossing its profile's threshold and getting blocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEvent {
    pub key: String,
    pub profile: RateLimitProfile,
    pub attempts: u32,
    pub blocked_until: i64,
    pub block_duration_ms: i64,
}

impl BlockEvent {
    /// Structured fields carried by the audit warning
    pub fn audit_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.key.clone()),
            ("profile", self.profile.as_str().to_string()),
            ("attempts", self.attempts.to_string()),
            ("blocked_until_ms", self.blocked_until.to_string()),
            ("block_secs", (self.block_duration_ms / 1000).to_string())
        ]
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    records: Arc<Mutex<HashMap<String, RateLimitRecord>>>,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            clock: self.clock.clone(),
            records: self.records.clone(),
        }
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn profile(&self, profile: RateLimitProfile) -> &ProfileConfig {
        match profile {
            RateLimitProfile::Auth => &self.config.auth,
            RateLimitProfile::Public => &self.config.public,
        }
    }

    /// Check whether `key` may attempt an action under `profile`
    ///
    /// Unknown keys get a record and are not limited. Expired windows and
    /// blocks are reset transparently.
    pub fn is_rate_limited(&self, key: &str, profile: RateLimitProfile) -> bool {
        let now = self.clock.now_ms();
        let thresholds = self.profile(profile);
        let mut records = self.records.lock();

        let record = records
            .entry(key.to_string())
            .or_insert_with(|| RateLimitRecord::fresh(now, thresholds));

        if record.is_blocked(now) {
            return true;
        }

        record.roll_over(now, thresholds);
        record.attempts >= thresholds.max_attempts
    }

    /// Record one attempt against the authentication profile
    pub fn increment(&self, key: &str) -> Option<BlockEvent> {
        self.increment_for(key, RateLimitProfile::Auth)
    }

    /// Record one attempt against an explicit profile
    ///
    /// Reaching the threshold blocks the key for the profile's block duration
    /// and emits a warning for auditing. The logged event is returned.
    pub fn increment_for(&self, key: &str, profile: RateLimitProfile) -> Option<BlockEvent> {
        let now = self.clock.now_ms();
        let thresholds = self.profile(profile);

        let event = {
            let mut records = self.records.lock();
            let record = records
                .entry(key.to_string())
                .or_insert_with(|| RateLimitRecord::fresh(now, thresholds));

            if record.is_blocked(now) {
                return None;
            }
            record.roll_over(now, thresholds);

            record.attempts = record.attempts.saturating_add(1);
            if record.attempts < thresholds.max_attempts {
                return None;
            }
            let until = now.saturating_add(thresholds.block_duration_ms);
            record.blocked_until = Some(until);
            BlockEvent {
                key: key.to_string(),
                profile,
                attempts: record.attempts,
                blocked_until: until,
                block_duration_ms: thresholds.block_duration_ms,
            }
        };

        logger::warning_with(
            LogTag::RateLimit,
            &format!("{} Rate limit exceeded, key blocked", SYMBOL_WARNING),
            &event.audit_fields()
        );
        Some(event)
    }

    /// Forget everything about `key`, e.g. after a successful login
    pub fn reset(&self, key: &str) {
        self.records.lock().remove(key);
    }

    /// Snapshot of a key without creating or mutating its record
    pub fn status(&self, key: &str, profile: RateLimitProfile) -> RateLimitStatus {
        let now = self.clock.now_ms();
        let thresholds = self.profile(profile);
        let records = self.records.lock();

        let mut record = match records.get(key) {
            Some(record) => record.clone(),
            None => RateLimitRecord::fresh(now, thresholds),
        };
        drop(records);

        if !record.is_blocked(now) {
            record.roll_over(now, thresholds);
        }

        let limited = record.is_blocked(now) || record.attempts >= thresholds.max_attempts;
        RateLimitStatus {
            limited,
            attempts: record.attempts,
            remaining_attempts: thresholds.max_attempts.saturating_sub(record.attempts),
            blocked_until: record.blocked_until.filter(|until| now < *until),
        }
    }

    /// Number of keys currently holding a record
    pub fn tracked_keys(&self) -> usize {
        self.records.lock().len()
    }

    /// Drop records whose window and block have both expired
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }

    /// Start the periodic background sweep
    pub fn start_sweeper(&self) -> SweepHandle {
        let limiter = self.clone();
        let interval = Duration::from_secs(self.config.sweep_interval_secs.max(1));
        spawn_sweep("rate_limiter", interval, move || {
            let limiter = limiter.clone();
            async move {
                let removed = limiter.sweep_expired();
                if removed > 0 {
                    logger::debug(LogTag::RateLimit, &format!("Swept {} expired records", removed));
                }
            }
        })
    }
}
