//! donationkit: protective middleware and amount arithmetic for donation
//! front ends.
//!
//! - [`cache`]: TTL cache with stale-while-revalidate reads
//! - [`security::rate_limiter`]: per-client attempt limiting with blocking
//! - [`security::csrf`]: anti-forgery tokens
//! - [`donation`]: fee offsets, crypto/fiat conversion, minimum checks

pub mod cache;
pub mod config;
pub mod core;
pub mod donation;
pub mod global;
pub mod logger;
pub mod security;
pub mod utils;

pub use crate::core::{ KitError, KitResult };
