use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host/IP address to bind the server
    pub host: String,
    /// Port to bind the server
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketConfig {
    /// Bounded window for the authentication handshake (seconds)
    pub auth_timeout_secs: u64,
    /// Server-initiated ping interval for authenticated sessions (seconds)
    pub heartbeat_secs: u64,
    /// Close sessions with no client activity past this window (seconds)
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for token signature verification
    pub shared_secret: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7000,
        }
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            auth_timeout_secs: 10,
            heartbeat_secs: 30,
            idle_timeout_secs: 90,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: "dev-secret-change-me".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            websocket: WebSocketConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist
    pub fn load(path: &str) -> Result<Config> {
        let config = if Path::new(path).exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file '{}'", path))?;
            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file '{}'", path))?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configured ranges
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }
        if self.websocket.auth_timeout_secs == 0 {
            anyhow::bail!("websocket.auth_timeout_secs must be non-zero");
        }
        if self.websocket.heartbeat_secs == 0 {
            anyhow::bail!("websocket.heartbeat_secs must be non-zero");
        }
        if self.websocket.idle_timeout_secs <= self.websocket.heartbeat_secs {
            anyhow::bail!(
                "websocket.idle_timeout_secs ({}) must exceed heartbeat_secs ({})",
                self.websocket.idle_timeout_secs,
                self.websocket.heartbeat_secs
            );
        }
        if self.auth.shared_secret.is_empty() {
            anyhow::bail!("auth.shared_secret must not be empty");
        }
        Ok(())
    }

    /// Bind address string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.websocket.auth_timeout_secs, 10);
        assert_eq!(config.bind_address(), "127.0.0.1:7000");
    }

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.websocket.heartbeat_secs, 30);
        config.validate().unwrap();
    }

    #[test]
    fn test_validation_rejects_bad_ranges() {
        let mut config = Config::default();
        config.websocket.idle_timeout_secs = config.websocket.heartbeat_secs;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.shared_secret.clear();
        assert!(config.validate().is_err());
    }
}
