//! Structured logging system for donationkit
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via --debug-<tag> flags
//! - Structured `key=value` metadata on any message
//! - Colored console output that never panics on broken pipes
//!
//! ## Usage
//!
//! ```rust
//! use donationkit::logger::{self, LogTag};
//!
//! logger::info(LogTag::Cache, "Cache configured");
//! logger::warning_with(LogTag::RateLimit, "Rate limit exceeded", &[("key", "10.0.0.1".to_string())]);
//! logger::debug(LogTag::Csrf, "Token issued"); // Only if --debug-csrf
//! ```

mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use self::config::{
    config_from_args,
    get_logger_config,
    init_from_args,
    set_logger_config,
    update_logger_config,
    LoggerConfig,
};
pub use self::core::{ render_fields, should_log, should_log_with };
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system from command-line arguments
///
/// Call once at startup, before services are constructed.
pub fn init() {
    config::init_from_args();
}

/// Log a message with structured metadata at any level
pub fn log_fields(tag: LogTag, level: LogLevel, message: &str, fields: &[(&str, String)]) {
    self::core::log_internal(tag, level, message, fields);
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    self::core::log_internal(tag, LogLevel::Error, message, &[]);
}

/// Log at ERROR level with structured metadata
pub fn error_with(tag: LogTag, message: &str, fields: &[(&str, String)]) {
    self::core::log_internal(tag, LogLevel::Error, message, fields);
}

/// Log at WARNING level (important issues)
pub fn warning(tag: LogTag, message: &str) {
    self::core::log_internal(tag, LogLevel::Warning, message, &[]);
}

/// Log at WARNING level with structured metadata
///
/// Used for auditable security events such as rate-limit blocks.
pub fn warning_with(tag: LogTag, message: &str, fields: &[(&str, String)]) {
    self::core::log_internal(tag, LogLevel::Warning, message, fields);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    self::core::log_internal(tag, LogLevel::Info, message, &[]);
}

/// Log at DEBUG level, only shown with --debug-<tag>
pub fn debug(tag: LogTag, message: &str) {
    self::core::log_internal(tag, LogLevel::Debug, message, &[]);
}

/// Log at VERBOSE level, only shown with --verbose
pub fn verbose(tag: LogTag, message: &str) {
    self::core::log_internal(tag, LogLevel::Verbose, message, &[]);
}
