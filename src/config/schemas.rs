/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Serde support
use crate::config_struct;
use crate::core::constants::*;
use serde::{ Deserialize, Deserializer };

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

config_struct! {
    /// In-memory cache policy
    pub struct CacheConfig {
        /// Maximum number of entries before oldest-first eviction
        max_size: usize = DEFAULT_CACHE_MAX_SIZE,

        /// Time an entry is fully fresh (milliseconds)
        ttl_ms: i64 = DEFAULT_CACHE_TTL_MS,

        /// Extra time a stale entry may still be served (milliseconds)
        stale_window_ms: i64 = DEFAULT_CACHE_STALE_WINDOW_MS,

        /// Background sweep interval (seconds)
        sweep_interval_secs: u64 = CACHE_SWEEP_INTERVAL_SECS,
    }
}

// ============================================================================
// RATE LIMIT CONFIGURATION
// ============================================================================

config_struct! {
    /// Thresholds for one rate-limit profile
    pub struct ProfileConfig {
        window_ms: i64 = AUTH_WINDOW_MS,
        max_attempts: u32 = AUTH_MAX_ATTEMPTS,
        block_duration_ms: i64 = AUTH_BLOCK_DURATION_MS,
    }
}

impl ProfileConfig {
    /// Profile guarding login and other authentication attempts
    pub fn auth() -> Self {
        Self::default()
    }

    /// Profile guarding public, unauthenticated endpoints
    pub fn public() -> Self {
        Self {
            window_ms: PUBLIC_WINDOW_MS,
            max_attempts: PUBLIC_MAX_ATTEMPTS,
            block_duration_ms: PUBLIC_BLOCK_DURATION_MS,
        }
    }
}

/// A profile table as written in a file; missing keys keep the named profile's values
#[derive(Debug, Deserialize)]
struct ProfileOverrides {
    window_ms: Option<i64>,
    max_attempts: Option<u32>,
    block_duration_ms: Option<i64>,
}

impl ProfileOverrides {
    fn apply_to(self, base: ProfileConfig) -> ProfileConfig {
        ProfileConfig {
            window_ms: self.window_ms.unwrap_or(base.window_ms),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
            block_duration_ms: self.block_duration_ms.unwrap_or(base.block_duration_ms),
        }
    }
}

fn deserialize_auth_profile<'de, D>(deserializer: D) -> Result<ProfileConfig, D::Error>
    where D: Deserializer<'de>
{
    Ok(ProfileOverrides::deserialize(deserializer)?.apply_to(ProfileConfig::auth()))
}

fn deserialize_public_profile<'de, D>(deserializer: D) -> Result<ProfileConfig, D::Error>
    where D: Deserializer<'de>
{
    Ok(ProfileOverrides::deserialize(deserializer)?.apply_to(ProfileConfig::public()))
}

config_struct! {
    /// Rate limiter profiles and sweep cadence
    pub struct RateLimitConfig {
        #[serde(deserialize_with = "deserialize_auth_profile")]
        auth: ProfileConfig = ProfileConfig::auth(),

        #[serde(deserialize_with = "deserialize_public_profile")]
        public: ProfileConfig = ProfileConfig::public(),

        /// Background sweep interval (seconds)
        sweep_interval_secs: u64 = RATE_LIMIT_SWEEP_INTERVAL_SECS,
    }
}

// ============================================================================
// CSRF CONFIGURATION
// ============================================================================

config_struct! {
    /// Anti-forgery token cookie settings
    pub struct CsrfConfig {
        /// Cookie `Domain` attribute
        domain: String = DEFAULT_APP_DOMAIN.to_string(),
        cookie_name: String = CSRF_COOKIE_NAME.to_string(),
        header_name: String = CSRF_HEADER_NAME.to_string(),

        /// Cookie `Max-Age` (seconds)
        max_age_secs: u64 = CSRF_COOKIE_MAX_AGE_SECS,
    }
}

// ============================================================================
// DONATION CONFIGURATION
// ============================================================================

config_struct! {
    /// Donation form limits
    pub struct DonationConfig {
        /// Minimum donation in USD before submission is allowed
        min_donation_usd: f64 = MIN_DONATION_STANDARD_USD,

        /// Optional upper bound in USD (0 = unlimited)
        max_donation_usd: f64 = 0.0,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        cache: CacheConfig = CacheConfig::default(),
        rate_limit: RateLimitConfig = RateLimitConfig::default(),
        csrf: CsrfConfig = CsrfConfig::default(),
        donation: DonationConfig = DonationConfig::default(),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl CacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("cache.max_size must be > 0".to_string());
        }
        if self.ttl_ms <= 0 {
            return Err("cache.ttl_ms must be > 0".to_string());
        }
        if self.stale_window_ms < 0 {
            return Err("cache.stale_window_ms cannot be negative".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("cache.sweep_interval_secs must be > 0".to_string());
        }
        Ok(())
    }
}

impl ProfileConfig {
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.window_ms <= 0 || self.block_duration_ms <= 0 {
            return Err(format!("rate_limit.{}: durations must be > 0", name));
        }
        if self.max_attempts == 0 {
            return Err(format!("rate_limit.{}.max_attempts must be > 0", name));
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section, reporting the first problem found
    pub fn validate(&self) -> Result<(), String> {
        self.cache.validate()?;
        self.rate_limit.auth.validate("auth")?;
        self.rate_limit.public.validate("public")?;

        if self.csrf.domain.trim().is_empty() {
            return Err("csrf.domain cannot be empty".to_string());
        }
        if self.donation.min_donation_usd < 0.0 {
            return Err("donation.min_donation_usd cannot be negative".to_string());
        }
        if
            self.donation.max_donation_usd > 0.0 &&
            self.donation.max_donation_usd < self.donation.min_donation_usd
        {
            return Err("donation.max_donation_usd is below the minimum".to_string());
        }
        Ok(())
    }
}
