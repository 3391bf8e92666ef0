/// Core logging implementation with automatic filtering
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires --debug-<module> flag for that tag
/// 4. Verbose level requires the --verbose flag
use super::levels::LogLevel;
use super::tags::LogTag;
use super::{get_logger_config, is_debug_enabled_for_tag};

/// Check if a log message should be displayed
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    // Rule 1: Errors always log (critical)
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();

    // Rule 3: Debug level requires debug mode for that specific tag,
    // even when --verbose raised the global threshold past it
    if level == LogLevel::Debug && is_debug_enabled_for_tag(tag) {
        return true;
    }

    // Rule 2/4: minimum level threshold covers the rest
    level <= config.min_level
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level, message);
}
