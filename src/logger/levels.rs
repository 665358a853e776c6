//! Severity levels, ordered from most to least important
//!
//! A message prints when its level is at or below the configured minimum,
//! so `Error < Warning < Info < Debug < Verbose`.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Always printed, even with --quiet
    Error = 0,
    /// Abuse signals and security failures
    Warning = 1,
    Info = 2,
    /// Needs --debug-<tag>
    Debug = 3,
    /// Needs --verbose or --verbose-<tag>
    Verbose = 4,
}

impl LogLevel {
    /// Fixed label used in the log prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Verbose => "VERBOSE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Case-insensitive; accepts `warn` and `trace` aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warning" | "warn" => LogLevel::Warning,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "verbose" | "trace" => LogLevel::Verbose,
            other => {
                return Err(format!("unknown log level '{}'", other));
            }
        };
        Ok(level)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_and_parsing() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Debug < LogLevel::Verbose);
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" Trace ".parse::<LogLevel>(), Ok(LogLevel::Verbose));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
