/// Centralized argument handling for tracedeck
///
/// Consolidates command-line flag parsing and per-module debug checks so
/// that logging and subsystems do not each rescan `env::args()`.
///
/// Features:
/// - Centralized CMD_ARGS storage with thread-safe access
/// - Debug flag checking functions for all modules
/// - Value extraction for flags like `--config <path>`
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
/// Thread-safe singleton that stores arguments for access throughout the application
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Sets the global command-line arguments
/// Used by tests to override the default env::args() collection
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
/// Returns a vector clone to avoid holding the mutex lock
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => {
            // Fallback to env::args if mutex is poisoned
            env::args().collect()
        }
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Gets the value of a command-line argument that follows a flag
/// Returns None if the flag is not found or has no value
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// =============================================================================
// DEBUG FLAG CHECKING FUNCTIONS
// =============================================================================

/// Gateway / handshake debug mode
pub fn is_debug_gateway_enabled() -> bool {
    has_arg("--debug-gateway")
}

/// Connection registry debug mode
pub fn is_debug_registry_enabled() -> bool {
    has_arg("--debug-registry")
}

/// Channel router debug mode
pub fn is_debug_router_enabled() -> bool {
    has_arg("--debug-router")
}

/// Broker debug mode
pub fn is_debug_broker_enabled() -> bool {
    has_arg("--debug-broker")
}

/// Global verbose mode
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Quiet mode (warnings and errors only)
pub fn is_quiet_enabled() -> bool {
    has_arg("--quiet")
}

/// Demo telemetry generator mode
pub fn is_demo_enabled() -> bool {
    has_arg("--demo")
}

/// Configuration file path override (`--config <path>`)
pub fn config_path_override() -> Option<String> {
    get_arg_value("--config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_lookup() {
        set_cmd_args(vec![
            "tracedeck".to_string(),
            "--debug-gateway".to_string(),
            "--config".to_string(),
            "custom.toml".to_string(),
        ]);

        assert!(has_arg("--debug-gateway"));
        assert!(!has_arg("--debug-router"));
        assert_eq!(get_arg_value("--config").as_deref(), Some("custom.toml"));
        assert_eq!(get_arg_value("--missing"), None);

        // Flag at the end has no value
        set_cmd_args(vec!["tracedeck".to_string(), "--config".to_string()]);
        assert_eq!(get_arg_value("--config"), None);
    }
}
