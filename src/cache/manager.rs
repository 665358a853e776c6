/// Generic in-memory cache with TTL, stale-while-revalidate and
/// oldest-first eviction
///
/// Thread-safe and cheap to clone (clones share the same store).
/// Tracks metrics for monitoring.

use super::config::CachePolicy;
use crate::core::{ Clock, SystemClock };
use crate::logger::{ self, LogTag };
use crate::utils::{ spawn_sweep, SweepHandle };
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Whether a read was served inside the TTL or from the stale window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Result of a successful cache read
///
/// A stale read tells the caller to refresh the key in the background.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<V> {
    pub value: V,
    pub freshness: Freshness,
    /// Milliseconds since the entry was written
    pub age_ms: i64,
}

impl<V> CacheRead<V> {
    pub fn is_stale(&self) -> bool {
        self.freshness == Freshness::Stale
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

/// Cache entry with TTL tracking
struct CacheEntry<V> {
    data: V,
    timestamp: i64,
    expires_at: i64,
    /// Insertion order, breaks timestamp ties during eviction
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn freshness(&self, now: i64, stale_window_ms: i64) -> Option<Freshness> {
        if now < self.expires_at {
            Some(Freshness::Fresh)
        } else if now < self.expires_at.saturating_add(stale_window_ms) {
            Some(Freshness::Stale)
        } else {
            None
        }
    }
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    /// Share of reads that returned a value, stale reads included
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.stale_hits + self.misses;
        if total == 0 {
            0.0
        } else {
            ((self.hits + self.stale_hits) as f64) / (total as f64)
        }
    }
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    metrics: CacheMetrics,
    next_seq: u64,
}

/// Generic cache manager keyed by string
pub struct CacheManager<V> {
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<CacheState<V>>>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            clock: self.clock.clone(),
            state: self.state.clone(),
        }
    }
}

impl<V> CacheManager<V> where V: Clone + Send + 'static {
    /// Create new cache with given policy and the system clock
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create new cache driven by an explicit clock
    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            state: Arc::new(
                Mutex::new(CacheState {
                    entries: HashMap::new(),
                    metrics: CacheMetrics::default(),
                    next_seq: 0,
                })
            ),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Store or overwrite a value
    ///
    /// When the store is full and `key` is new, the entry with the oldest
    /// write timestamp is evicted first. Reads do not refresh age.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        if state.entries.len() >= self.policy.max_size && !state.entries.contains_key(&key) {
            Self::evict_oldest(&mut state);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(key, CacheEntry {
            data: value,
            timestamp: now,
            expires_at: now.saturating_add(self.policy.ttl_ms),
            seq,
        });
        state.metrics.inserts += 1;
    }

    /// Read a value
    ///
    /// Returns the value tagged `Fresh` inside the TTL, tagged `Stale` inside
    /// the stale window, and `None` (removing the entry) afterwards.
    pub async fn get(&self, key: &str) -> Option<CacheRead<V>> {
        let now = self.clock.now_ms();
        let mut state = self.state.lock();

        let lookup = state.entries.get(key).map(|entry| {
            entry.freshness(now, self.policy.stale_window_ms).map(|freshness| CacheRead {
                value: entry.data.clone(),
                freshness,
                age_ms: now - entry.timestamp,
            })
        });

        let read = match lookup {
            None => None,
            Some(Some(read)) => Some(read),
            Some(None) => {
                state.entries.remove(key);
                state.metrics.expirations += 1;
                None
            }
        };

        match &read {
            Some(r) if r.is_stale() => {
                state.metrics.stale_hits += 1;
                drop(state);
                logger::debug(
                    LogTag::Cache,
                    &format!("Serving stale entry '{}' (age {}ms)", key, r.age_ms)
                );
            }
            Some(_) => {
                state.metrics.hits += 1;
            }
            None => {
                state.metrics.misses += 1;
            }
        }

        read
    }

    /// Read only the value, ignoring freshness
    pub async fn get_value(&self, key: &str) -> Option<V> {
        self.get(key).await.map(CacheRead::into_value)
    }

    /// Remove one key (no-op if absent)
    pub fn invalidate(&self, key: &str) {
        self.state.lock().entries.remove(key);
    }

    /// Clear all entries
    pub fn invalidate_all(&self) {
        self.state.lock().entries.clear();
    }

    /// Remove every entry past `ttl + stale_window`, returning how many were dropped
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let stale_window = self.policy.stale_window_ms;
        let mut state = self.state.lock();

        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.freshness(now, stale_window).is_some());
        let removed = before - state.entries.len();
        state.metrics.expirations += removed as u64;

        removed
    }

    /// Start the periodic background sweep
    ///
    /// The sweep holds a clone of the cache; stop or drop the handle to release it.
    pub fn start_sweeper(&self) -> SweepHandle {
        let cache = self.clone();
        spawn_sweep("cache", self.policy.sweep_interval, move || {
            let cache = cache.clone();
            async move {
                let removed = cache.sweep_expired();
                if removed > 0 {
                    logger::debug(LogTag::Cache, &format!("Swept {} expired entries", removed));
                }
            }
        })
    }

    /// Get current metrics
    pub fn metrics(&self) -> CacheMetrics {
        self.state.lock().metrics.clone()
    }

    /// Get current cache size (expired-but-unswept entries included)
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_oldest(state: &mut CacheState<V>) {
        let oldest = state.entries
            .iter()
            .min_by_key(|(_, entry)| (entry.timestamp, entry.seq))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            state.entries.remove(&key);
            state.metrics.evictions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use serde_json::json;
    use std::time::Duration;

    const TTL: i64 = 1_000;
    const STALE: i64 = 500;

    fn cache_with_clock(max_size: usize) -> (CacheManager<serde_json::Value>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = CacheManager::with_clock(CachePolicy::custom(max_size, TTL, STALE), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_fresh_until_ttl() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("price:eth", json!(2500.5));

        clock.advance(TTL - 1);
        let read = cache.get("price:eth").await.unwrap();
        assert_eq!(read.value, json!(2500.5));
        assert_eq!(read.freshness, Freshness::Fresh);
        assert_eq!(read.age_ms, TTL - 1);
    }

    #[tokio::test]
    async fn test_stale_window_then_gone() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("k", json!("v"));

        clock.advance(TTL + 1);
        let read = cache.get("k").await.unwrap();
        assert!(read.is_stale());
        assert_eq!(read.value, json!("v"));

        clock.advance(STALE);
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.len(), 0);

        let metrics = cache.metrics();
        assert_eq!(metrics.stale_hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.expirations, 1);
    }

    #[tokio::test]
    async fn test_boundary_at_expiry_is_stale() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("k", json!(1));
        clock.advance(TTL);
        assert!(cache.get("k").await.unwrap().is_stale());
    }

    #[tokio::test]
    async fn test_zero_stale_window_expires_at_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let cache: CacheManager<u32> = CacheManager::with_clock(
            CachePolicy::custom(10, TTL, 0),
            clock.clone()
        );
        cache.set("k", 7);
        clock.advance(TTL);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_resets_timestamps() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("k", json!(1));
        clock.advance(TTL - 10);
        cache.set("k", json!(2));
        clock.advance(TTL - 10);

        let read = cache.get("k").await.unwrap();
        assert_eq!(read.value, json!(2));
        assert_eq!(read.freshness, Freshness::Fresh);
    }

    #[tokio::test]
    async fn test_oldest_first_eviction() {
        let (cache, clock) = cache_with_clock(3);
        for key in ["a", "b", "c"] {
            cache.set(key, json!(key));
            clock.advance(1);
        }

        // Reading "a" must not protect it: eviction is by write time, not access
        assert!(cache.get("a").await.is_some());

        cache.set("d", json!("d"));
        assert!(cache.get("a").await.is_none());
        for key in ["b", "c", "d"] {
            assert_eq!(cache.get(key).await.unwrap().value, json!(key));
        }
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[tokio::test]
    async fn test_eviction_tie_breaks_on_insertion_order() {
        let (cache, _clock) = cache_with_clock(2);
        cache.set("first", json!(1));
        cache.set("second", json!(2));
        cache.set("third", json!(3));

        assert!(cache.get("first").await.is_none());
        assert!(cache.get("second").await.is_some());
        assert!(cache.get("third").await.is_some());
    }

    #[tokio::test]
    async fn test_overwrite_at_capacity_does_not_evict() {
        let (cache, _clock) = cache_with_clock(2);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        cache.set("a", json!(3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.metrics().evictions, 0);
        assert_eq!(cache.get_value("a").await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_values_round_trip() {
        let (cache, _clock) = cache_with_clock(10);
        let nested = json!({
            "campaign": { "id": 42, "tags": ["water", "health"] },
            "goal": 10000.0
        });
        cache.set("int", json!(5));
        cache.set("array", json!([1, "two", 3.0]));
        cache.set("nested", nested.clone());
        cache.set("null", serde_json::Value::Null);

        assert_eq!(cache.get_value("int").await, Some(json!(5)));
        assert_eq!(cache.get_value("array").await, Some(json!([1, "two", 3.0])));
        assert_eq!(cache.get_value("nested").await, Some(nested));

        // A stored null is present, an unknown key is absent
        assert_eq!(cache.get_value("null").await, Some(serde_json::Value::Null));
        assert_eq!(cache.get_value("missing").await, None);
    }

    #[tokio::test]
    async fn test_stored_none_distinct_from_absent() {
        let cache: CacheManager<Option<String>> = CacheManager::new(CachePolicy::custom(4, 60_000, 0));
        cache.set("maybe", None);
        assert_eq!(cache.get_value("maybe").await, Some(None));
        assert_eq!(cache.get_value("nope").await, None);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (cache, _clock) = cache_with_clock(10);
        cache.set("a", json!(1));
        cache.set("b", json!(2));

        cache.invalidate("a");
        cache.invalidate("never-set");
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_unservable() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("old", json!(1));
        clock.advance(TTL);
        cache.set("stale-soon", json!(2));
        clock.advance(STALE);

        // "old" is past ttl + stale, "stale-soon" is still fresh
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("stale-soon").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_sweep_bounds_memory() {
        let clock = Arc::new(ManualClock::new(0));
        let mut policy = CachePolicy::custom(10, TTL, STALE);
        policy.sweep_interval = Duration::from_secs(60);
        let cache: CacheManager<u8> = CacheManager::with_clock(policy, clock.clone());

        let handle = cache.start_sweeper();
        cache.set("abandoned", 1);
        clock.advance(TTL + STALE);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(cache.is_empty());

        handle.stop().await;
    }

    #[test]
    fn test_hit_rate() {
        let metrics = CacheMetrics { hits: 2, stale_hits: 1, misses: 1, ..Default::default() };
        assert!((metrics.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheMetrics::default().hit_rate(), 0.0);
    }
}
