//! Process-wide shared service instances
//!
//! Prefer constructing services explicitly and passing them down. These
//! bindings exist for call sites that need one shared instance per process:
//! each is created lazily exactly once, the first configuration wins, and
//! `shutdown_shared_services` stops their background sweeps.
//!
//! Background sweeps need a tokio runtime. An instance first touched outside
//! one starts its sweep on the first later access made inside a runtime.
use crate::cache::{ CacheManager, CachePolicy, Freshness };
use crate::config::with_config;
use crate::core::KitResult;
use crate::logger::{ self, LogTag };
use crate::security::{ CsrfManager, MemoryCookieStore, RateLimiter };
use crate::utils::SweepHandle;
use once_cell::sync::{ Lazy, OnceCell };
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;

static SHARED_CACHE: OnceCell<CacheManager<Value>> = OnceCell::new();
static SHARED_RATE_LIMITER: OnceCell<RateLimiter> = OnceCell::new();
static SHARED_CSRF: OnceCell<CsrfManager> = OnceCell::new();

/// Cookie jar backing the shared CSRF manager
pub static SHARED_COOKIES: Lazy<Arc<MemoryCookieStore>> = Lazy::new(|| Arc::new(MemoryCookieStore::new()));

static SHARED_SWEEPS: Lazy<Mutex<Vec<SweepHandle>>> = Lazy::new(|| Mutex::new(Vec::new()));
static CACHE_SWEEP_STARTED: AtomicBool = AtomicBool::new(false);
static LIMITER_SWEEP_STARTED: AtomicBool = AtomicBool::new(false);

/// Start a sweep once, as soon as a tokio runtime is available
///
/// Returns true when this call started it. Without a runtime the sweep stays
/// pending and the next call retries.
fn ensure_sweep(
    started: &AtomicBool,
    registry: &Mutex<Vec<SweepHandle>>,
    start: impl FnOnce() -> SweepHandle
) -> bool {
    if started.load(Ordering::Acquire) {
        return false;
    }
    if tokio::runtime::Handle::try_current().is_err() {
        logger::debug(LogTag::System, "No async runtime yet, shared sweep deferred");
        return false;
    }
    if started.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
        return false;
    }
    registry.lock().push(start());
    true
}

/// Configure the shared cache; later calls with another policy are ignored
pub fn configure_cache(policy: CachePolicy) -> &'static CacheManager<Value> {
    let mut created = false;
    let cache = SHARED_CACHE.get_or_init(|| {
        created = true;
        CacheManager::new(policy)
    });

    if created {
        logger::info(
            LogTag::Cache,
            &format!(
                "Shared cache configured (max_size={}, ttl={}ms, stale_window={}ms)",
                policy.max_size,
                policy.ttl_ms,
                policy.stale_window_ms
            )
        );
    } else if cache.policy() != &policy {
        logger::debug(LogTag::Cache, "Shared cache already configured, new policy ignored");
    }

    ensure_sweep(&CACHE_SWEEP_STARTED, &SHARED_SWEEPS, || cache.start_sweeper());
    cache
}

/// Shared cache, configured from the loaded configuration on first use
pub fn shared_cache() -> &'static CacheManager<Value> {
    match SHARED_CACHE.get() {
        Some(cache) => {
            ensure_sweep(&CACHE_SWEEP_STARTED, &SHARED_SWEEPS, || cache.start_sweeper());
            cache
        }
        None => configure_cache(with_config(|cfg| CachePolicy::from(&cfg.cache))),
    }
}

/// Shared rate limiter, configured from the loaded configuration on first use
pub fn shared_rate_limiter() -> &'static RateLimiter {
    let limiter = SHARED_RATE_LIMITER.get_or_init(|| {
        RateLimiter::new(with_config(|cfg| cfg.rate_limit.clone()))
    });
    ensure_sweep(&LIMITER_SWEEP_STARTED, &SHARED_SWEEPS, || limiter.start_sweeper());
    limiter
}

pub fn shared_csrf() -> &'static CsrfManager {
    SHARED_CSRF.get_or_init(|| {
        CsrfManager::new(with_config(|cfg| cfg.csrf.clone()), SHARED_COOKIES.clone())
    })
}

/// Serialize `value` into the shared cache
pub fn cache_serialized<T: Serialize>(key: &str, value: &T) -> KitResult<()> {
    shared_cache().set(key, serde_json::to_value(value)?);
    Ok(())
}

/// Read a typed value back from the shared cache along with its freshness
///
/// A cached value that no longer matches `T` is an error, not a miss.
pub async fn cached_as<T: DeserializeOwned>(key: &str) -> KitResult<Option<(T, Freshness)>> {
    match shared_cache().get(key).await {
        Some(read) => Ok(Some((serde_json::from_value(read.value)?, read.freshness))),
        None => Ok(None),
    }
}

/// Stop every background sweep owned by the shared instances
pub async fn shutdown_shared_services() {
    let handles: Vec<SweepHandle> = std::mem::take(&mut *SHARED_SWEEPS.lock());
    let count = handles.len();
    for handle in handles {
        handle.stop().await;
    }
    if count > 0 {
        logger::info(LogTag::System, &format!("Stopped {} shared sweep(s)", count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::CookieStore;

    #[tokio::test]
    async fn test_shared_instances_are_singletons() {
        let first = configure_cache(CachePolicy::custom(100, 60_000, 0));
        let second = configure_cache(CachePolicy::custom(99, 5, 5));
        assert!(std::ptr::eq(first, second));
        assert_ne!(second.policy().max_size, 99);
        assert!(std::ptr::eq(shared_cache(), first));

        assert!(std::ptr::eq(shared_rate_limiter(), shared_rate_limiter()));

        let token = shared_csrf().get_token().unwrap();
        assert_eq!(SHARED_COOKIES.get_cookie("XSRF-TOKEN").map(|c| c.value), Some(token));

        shutdown_shared_services().await;
        assert!(SHARED_SWEEPS.lock().is_empty());
    }

    #[tokio::test]
    async fn test_typed_cache_helpers() {
        let quote = crate::donation::quote(20.0, Some(0.5), &crate::donation::MinimumDonation::standard());
        cache_serialized("quote:20", &quote.fee).unwrap();

        let (fee, freshness) = cached_as::<crate::donation::FeeOffset>("quote:20").await.unwrap().unwrap();
        assert_eq!(fee, quote.fee);
        assert_eq!(freshness, Freshness::Fresh);

        assert!(cached_as::<crate::donation::FeeOffset>("quote:missing").await.unwrap().is_none());
        assert!(matches!(
            cached_as::<u32>("quote:20").await,
            Err(crate::core::KitError::Serialization(_))
        ));
    }

    #[test]
    fn test_sweep_deferred_until_runtime_exists() {
        let started = AtomicBool::new(false);
        let registry: Mutex<Vec<SweepHandle>> = Mutex::new(Vec::new());
        let cache: CacheManager<u8> = CacheManager::new(CachePolicy::custom(4, 1_000, 0));

        // No runtime on this thread: nothing starts, nothing is lost
        assert!(!ensure_sweep(&started, &registry, || cache.start_sweeper()));
        assert!(registry.lock().is_empty());

        let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        runtime.block_on(async {
            assert!(ensure_sweep(&started, &registry, || cache.start_sweeper()));
            assert!(!ensure_sweep(&started, &registry, || cache.start_sweeper()));
        });
        assert_eq!(registry.lock().len(), 1);

        let handles: Vec<SweepHandle> = std::mem::take(&mut *registry.lock());
        runtime.block_on(async {
            for handle in handles {
                handle.stop().await;
            }
        });
    }
}
