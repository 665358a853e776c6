/// Logger configuration derived from command-line arguments
///
/// Recognised flags:
/// - `--debug-<tag>`: enable DEBUG output for one tag
/// - `--verbose`: enable VERBOSE output for every tag
/// - `--verbose-<tag>`: enable VERBOSE output for one tag
/// - `--quiet`: only errors
/// - `--log-level=<level>`: explicit minimum level
///
/// `--quiet` beats `--log-level`, which beats the level implied by any
/// `--verbose*` flag, regardless of argument order.
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Highest level that may be printed
    pub min_level: LogLevel,
    /// Tags allowed to print at all (empty = every tag)
    pub enabled_tags: HashSet<String>,
    /// Tags with DEBUG output enabled
    pub debug_tags: HashSet<String>,
    /// Tags with VERBOSE output enabled
    pub verbose_tags: HashSet<String>,
    /// DEBUG and VERBOSE output for every tag
    pub verbose_all: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            enabled_tags: HashSet::new(),
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            verbose_all: false,
        }
    }
}

impl LoggerConfig {
    pub fn is_debug_enabled_for(&self, tag: &LogTag) -> bool {
        self.verbose_all || self.debug_tags.contains(&tag.to_debug_key())
    }

    pub fn is_verbose_enabled_for(&self, tag: &LogTag) -> bool {
        self.verbose_all || self.verbose_tags.contains(&tag.to_debug_key())
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn update_logger_config<F: FnOnce(&mut LoggerConfig)>(f: F) {
    f(&mut LOGGER_CONFIG.write());
}

/// Build the logger configuration from an argument list
pub fn config_from_args<I, S>(args: I) -> LoggerConfig where I: IntoIterator<Item = S>, S: AsRef<str> {
    let mut config = LoggerConfig::default();
    let mut quiet = false;
    let mut explicit_level: Option<LogLevel> = None;

    for arg in args {
        let arg = arg.as_ref();
        if arg == "--quiet" {
            quiet = true;
        } else if arg == "--verbose" {
            config.verbose_all = true;
        } else if let Some(raw) = arg.strip_prefix("--log-level=") {
            if let Ok(level) = raw.parse() {
                explicit_level = Some(level);
            }
        } else if let Some(tag) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(tag.to_lowercase());
        } else if let Some(tag) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(tag.to_lowercase());
        }
    }

    config.min_level = if quiet {
        LogLevel::Error
    } else if let Some(level) = explicit_level {
        level
    } else if config.verbose_all || !config.verbose_tags.is_empty() {
        LogLevel::Verbose
    } else {
        LogLevel::Debug
    };

    config
}

/// Scan `std::env::args` and install the resulting configuration
pub fn init_from_args() {
    set_logger_config(config_from_args(std::env::args()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_args() {
        let config = config_from_args(["donationkit", "--debug-cache", "--verbose-CSRF"]);
        assert!(config.debug_tags.contains("cache"));
        assert!(config.verbose_tags.contains("csrf"));
        assert_eq!(config.min_level, LogLevel::Verbose);
        assert!(!config.verbose_all);
        assert!(config.is_verbose_enabled_for(&LogTag::Csrf));
        assert!(!config.is_debug_enabled_for(&LogTag::Csrf));

        let plain = config_from_args(["donationkit", "--debug-cache"]);
        assert_eq!(plain.min_level, LogLevel::Debug);

        let quiet = config_from_args(["donationkit", "--quiet"]);
        assert_eq!(quiet.min_level, LogLevel::Error);

        let explicit = config_from_args(["--log-level=warn", "--log-level=bogus"]);
        assert_eq!(explicit.min_level, LogLevel::Warning);

        // Quiet wins regardless of order
        let mixed = config_from_args(["--verbose-csrf", "--quiet", "--verbose"]);
        assert_eq!(mixed.min_level, LogLevel::Error);
    }
}
