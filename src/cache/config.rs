/// Cache policy per use case
///
/// TTLs and capacities tuned for what the surrounding application caches:
/// - Price lookups: short TTL, generous stale window (prices move, but an
///   old quote beats an empty field)
/// - Profile reads: longer TTL, small stale window

use crate::config::CacheConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum number of entries (oldest-first eviction when exceeded)
    pub max_size: usize,

    /// Time an entry is fully fresh, in milliseconds
    pub ttl_ms: i64,

    /// Additional time a stale entry may still be served, in milliseconds
    pub stale_window_ms: i64,

    /// Background sweep cadence
    pub sweep_interval: Duration,
}

impl CachePolicy {
    /// Token price lookups from the price oracle
    pub fn price_lookups() -> Self {
        Self {
            max_size: 500,
            ttl_ms: 30_000,
            stale_window_ms: 120_000,
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Donor and campaign profile reads
    pub fn profile_reads() -> Self {
        Self {
            max_size: 2000,
            ttl_ms: 5 * 60_000,
            stale_window_ms: 60_000,
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Custom configuration
    ///
    /// Zero sizes and negative durations are clamped to the smallest legal
    /// values instead of failing.
    pub fn custom(max_size: usize, ttl_ms: i64, stale_window_ms: i64) -> Self {
        Self {
            max_size: max_size.max(1),
            ttl_ms: ttl_ms.max(1),
            stale_window_ms: stale_window_ms.max(0),
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Milliseconds after creation at which an entry becomes unservable
    pub fn servable_for_ms(&self) -> i64 {
        self.ttl_ms.saturating_add(self.stale_window_ms)
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        let mut policy = Self::custom(config.max_size, config.ttl_ms, config.stale_window_ms);
        policy.sweep_interval = Duration::from_secs(config.sweep_interval_secs.max(1));
        policy
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}
