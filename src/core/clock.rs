/// Millisecond wall clock shared by the cache and rate limiter
///
/// Services take an `Arc<dyn Clock>` so tests can drive time explicitly
/// instead of sleeping.
use chrono::Utc;
use std::sync::atomic::{ AtomicI64, Ordering };

pub trait Clock: Send + Sync {
    /// Current time as milliseconds since the Unix epoch
    fn now_ms(&self) -> i64;
}

/// Production clock backed by `chrono::Utc`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for deterministic tests and simulations
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self { now: AtomicI64::new(start_ms) }
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::Release);
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::Acquire)
    }
}
