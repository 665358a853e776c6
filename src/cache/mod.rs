//! In-memory caching for expensive or frequently repeated lookups
//!
//! Values expire after a TTL but stay servable for a stale window, so
//! callers can show the last known value while refreshing it.

pub mod config;
pub mod manager;

pub use config::CachePolicy;
pub use manager::{ CacheManager, CacheMetrics, CacheRead, Freshness };
