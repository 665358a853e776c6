/// Configuration utilities - loading, environment overrides, and access helpers
///
/// Configuration is parsed once at startup:
/// 1. `data/config.toml` (or an explicit path) if it exists, otherwise defaults
/// 2. Environment variable overrides
/// 3. Validation
use super::schemas::Config;
use crate::core::constants::{
    ENV_APP_DOMAIN,
    ENV_CACHE_MAX_SIZE,
    ENV_CACHE_TTL_SECS,
    ENV_MIN_DONATION_USD,
};
use crate::core::{ KitError, KitResult };
use crate::logger::{ self, LogTag };
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

/// Global configuration instance
///
/// Access it using the helper functions below.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from the default path and initialize the global CONFIG
pub fn load_config() -> KitResult<()> {
    load_config_from_path(CONFIG_FILE_PATH)
}

/// Load configuration from a specific file path and initialize the global CONFIG
///
/// A missing file is not an error: defaults are used and a warning is logged.
pub fn load_config_from_path(path: &str) -> KitResult<()> {
    let config = read_config_file(path)?;
    install_config(config)
}

/// Parse a configuration file, apply environment overrides and validate
pub fn read_config_file(path: &str) -> KitResult<Config> {
    let mut config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)?;
        load_config_from_str(&contents)?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path)
        );
        Config::default()
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.validate().map_err(KitError::Config)?;
    Ok(config)
}

/// Parse configuration from TOML text (no overrides, no validation)
pub fn load_config_from_str(contents: &str) -> KitResult<Config> {
    Ok(toml::from_str::<Config>(contents)?)
}

/// Apply environment overrides using the given variable lookup
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> KitResult<()>
    where F: Fn(&str) -> Option<String>
{
    if let Some(domain) = lookup(ENV_APP_DOMAIN) {
        config.csrf.domain = domain.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_MIN_DONATION_USD) {
        config.donation.min_donation_usd = parse_env(ENV_MIN_DONATION_USD, &raw)?;
    }

    if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
        let secs: i64 = parse_env(ENV_CACHE_TTL_SECS, &raw)?;
        config.cache.ttl_ms = secs.saturating_mul(1000);
    }

    if let Some(raw) = lookup(ENV_CACHE_MAX_SIZE) {
        config.cache.max_size = parse_env(ENV_CACHE_MAX_SIZE, &raw)?;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> KitResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| KitError::Config(format!("Invalid value for {}: '{}'", name, raw)))
}

/// Install an already-built configuration as the global CONFIG
pub fn install_config(config: Config) -> KitResult<()> {
    CONFIG.set(RwLock::new(config)).map_err(|_|
        KitError::Config("Config already initialized".to_string())
    )?;
    logger::debug(LogTag::Config, "Configuration installed");
    Ok(())
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when the configuration was never loaded, so
/// library users that skip `load_config` still get sane policies.
pub fn with_config<F, R>(f: F) -> R where F: FnOnce(&Config) -> R {
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Check if configuration has been initialized
pub fn is_config_initialized() -> bool {
    CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{
        AUTH_BLOCK_DURATION_MS,
        AUTH_WINDOW_MS,
        PUBLIC_MAX_ATTEMPTS,
        PUBLIC_WINDOW_MS,
    };
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = load_config_from_str(
            r#"
            [cache]
            max_size = 50

            [rate_limit.public]
            max_attempts = 10
            "#
        ).unwrap();

        assert_eq!(config.cache.max_size, 50);
        assert_eq!(config.cache.ttl_ms, Config::default().cache.ttl_ms);
        assert_eq!(config.rate_limit.public.max_attempts, 10);
        assert_eq!(config.rate_limit.public.window_ms, Config::default().rate_limit.public.window_ms);
        assert_eq!(
            config.rate_limit.public.block_duration_ms,
            Config::default().rate_limit.public.block_duration_ms
        );
        assert_eq!(config.rate_limit.auth, Config::default().rate_limit.auth);
        assert_eq!(config.csrf.cookie_name, "XSRF-TOKEN");
    }

    #[test]
    fn test_partial_profiles_keep_their_own_defaults() {
        let config = load_config_from_str(
            r#"
            [rate_limit.auth]
            max_attempts = 8

            [rate_limit.public]
            block_duration_ms = 7200000
            "#
        ).unwrap();

        assert_eq!(config.rate_limit.auth.max_attempts, 8);
        assert_eq!(config.rate_limit.auth.window_ms, AUTH_WINDOW_MS);
        assert_eq!(config.rate_limit.auth.block_duration_ms, AUTH_BLOCK_DURATION_MS);

        assert_eq!(config.rate_limit.public.block_duration_ms, 7_200_000);
        assert_eq!(config.rate_limit.public.window_ms, PUBLIC_WINDOW_MS);
        assert_eq!(config.rate_limit.public.max_attempts, PUBLIC_MAX_ATTEMPTS);
        assert!(config.rate_limit.public.block_duration_ms > config.rate_limit.auth.block_duration_ms);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_APP_DOMAIN, " give.example.org "),
            (ENV_MIN_DONATION_USD, "42"),
            (ENV_CACHE_TTL_SECS, "30"),
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.csrf.domain, "give.example.org");
        assert_eq!(config.donation.min_donation_usd, 42.0);
        assert_eq!(config.cache.ttl_ms, 30_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_env_override_is_config_error() {
        let mut config = Config::default();
        let result = apply_overrides(&mut config, |name| {
            (name == ENV_CACHE_MAX_SIZE).then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(KitError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut config = Config::default();
        config.cache.max_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_toml_is_error() {
        assert!(matches!(load_config_from_str("cache = 3"), Err(KitError::Toml(_))));
    }
}
