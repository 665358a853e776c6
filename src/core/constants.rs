// Donation arithmetic
pub const FEE_PERCENTAGE: f64 = 0.03; // 3% processor fee
pub const FIAT_DECIMALS: i32 = 2;
pub const CONVERSION_TOLERANCE: f64 = 1e-9;

// Minimum donation floors (USD)
pub const MIN_DONATION_STANDARD_USD: f64 = 10.0;
pub const MIN_DONATION_EXTENDED_USD: f64 = 42.0;

// Cache settings
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;
pub const DEFAULT_CACHE_TTL_MS: i64 = 5 * 60 * 1000;
pub const DEFAULT_CACHE_STALE_WINDOW_MS: i64 = 60 * 1000;
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 60;

// Rate limiter settings
pub const AUTH_WINDOW_MS: i64 = 15 * 60 * 1000;
pub const AUTH_MAX_ATTEMPTS: u32 = 5;
pub const AUTH_BLOCK_DURATION_MS: i64 = 15 * 60 * 1000;
pub const PUBLIC_WINDOW_MS: i64 = 60 * 60 * 1000;
pub const PUBLIC_MAX_ATTEMPTS: u32 = 3;
pub const PUBLIC_BLOCK_DURATION_MS: i64 = 60 * 60 * 1000;
pub const RATE_LIMIT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

// CSRF settings
pub const CSRF_TOKEN_BYTES: usize = 32;
pub const CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";
pub const CSRF_COOKIE_MAX_AGE_SECS: u64 = 2 * 60 * 60;
pub const DEFAULT_APP_DOMAIN: &str = "localhost";

// Environment overrides
pub const ENV_APP_DOMAIN: &str = "DONATIONKIT_APP_DOMAIN";
pub const ENV_MIN_DONATION_USD: &str = "DONATIONKIT_MIN_DONATION_USD";
pub const ENV_CACHE_TTL_SECS: &str = "DONATIONKIT_CACHE_TTL_SECS";
pub const ENV_CACHE_MAX_SIZE: &str = "DONATIONKIT_CACHE_MAX_SIZE";

// Unicode symbols for display
pub const SYMBOL_CHECK: &str = "✅";
pub const SYMBOL_CROSS: &str = "❌";
pub const SYMBOL_WARNING: &str = "⚠️";
pub const SYMBOL_LOCK: &str = "🔒";
pub const SYMBOL_MONEY: &str = "💰";
