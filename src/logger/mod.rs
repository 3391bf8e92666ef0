//! Structured console logging for tracedeck
//!
//! Provides a tag + level logging API:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Colored console output with timestamps
//!
//! ## Usage
//!
//! ```rust
//! use tracedeck::logger::{self, LogTag};
//!
//! logger::error(LogTag::Gateway, "Handshake failed");
//! logger::info(LogTag::Router, "Pattern subscriptions established");
//! logger::debug(LogTag::Registry, "Session 4 registered"); // Only with --debug-registry
//! ```
//!
//! Call `logger::init()` once at startup before any logging occurs.

mod core;
mod format;
mod levels;
mod tags;

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::arguments;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Runtime logger configuration derived from command-line flags
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level threshold (Error always passes)
    pub min_level: LogLevel,

    /// Tags with --debug-<module> enabled
    pub debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Initialize the logger from command-line arguments
///
/// Scans for --quiet, --verbose and --debug-<module> flags and configures
/// the filtering rules. Call once at startup.
pub fn init() {
    let mut debug_tags = HashSet::new();
    for tag in LogTag::all() {
        if arguments::has_arg(&format!("--debug-{}", tag.to_debug_key())) {
            debug_tags.insert(tag.to_debug_key().to_string());
        }
    }

    let min_level = if arguments::is_verbose_enabled() {
        LogLevel::Verbose
    } else if arguments::is_quiet_enabled() {
        LogLevel::Warning
    } else {
        LogLevel::Info
    };

    if let Ok(mut config) = LOGGER_CONFIG.write() {
        *config = LoggerConfig {
            min_level,
            debug_tags,
        };
    }
}

/// Get a snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

/// Check whether debug output is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config()
        .debug_tags
        .contains(tag.to_debug_key())
}

/// Log at ERROR level (always shown, critical issues)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (important issues that need attention)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (detailed diagnostics)
///
/// Shown only when the matching --debug-<module> flag is provided.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (very detailed tracing, gated by --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
