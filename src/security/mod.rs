//! Request protection: per-client rate limiting and anti-forgery tokens

pub mod cookie;
pub mod csrf;
pub mod rate_limiter;

pub use cookie::{ Cookie, CookieStore, MemoryCookieStore, SameSite };
pub use csrf::{ CsrfManager, EntropySource, OsEntropy };
pub use rate_limiter::{ BlockEvent, RateLimitProfile, RateLimitRecord, RateLimitStatus, RateLimiter };
