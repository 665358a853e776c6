/// Core logging implementation with automatic filtering
///
/// This module contains the central logging logic that:
/// - Checks if a log should be displayed based on level and tag
/// - Renders structured fields onto the message
/// - Delegates to the format module for output

use super::config::{ get_logger_config, LoggerConfig };
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed under the active configuration
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    should_log_with(&get_logger_config(), tag, level)
}

/// Filtering rules, in order:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires --debug-<tag> (or --verbose)
/// 4. Verbose level requires --verbose OR --verbose-<tag>
/// 5. If enabled_tags is non-empty, tag must be in the set
pub fn should_log_with(config: &LoggerConfig, tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    if level == LogLevel::Debug {
        return config.is_debug_enabled_for(tag);
    }

    if level == LogLevel::Verbose {
        return config.is_verbose_enabled_for(tag);
    }

    if !config.enabled_tags.is_empty() && !config.enabled_tags.contains(&tag.to_debug_key()) {
        return false;
    }

    true
}

/// Append `key=value` pairs to a message
pub fn render_fields(message: &str, fields: &[(&str, String)]) -> String {
    if fields.is_empty() {
        return message.to_string();
    }

    let rendered: Vec<String> = fields
        .iter()
        .map(|(key, value)| {
            if value.contains(' ') {
                format!("{}=\"{}\"", key, value)
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect();

    format!("{} {}", message, rendered.join(" "))
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str, fields: &[(&str, String)]) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(&tag, level, &render_fields(message, fields));
}
