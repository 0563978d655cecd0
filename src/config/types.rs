//! Core configuration types.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::defaults::{
    default_hostname, default_listen_address, default_name, default_ping_time, default_true,
    default_welcome_message,
};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and behavior.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity and connection-core settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Software name reported in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Host name used as the prefix of every server-originated message.
    #[serde(default = "default_hostname")]
    pub hostname: String,
    /// Trailing text of the `001` welcome numeric.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
    /// Hold registration until the client has picked a nickname.
    #[serde(default)]
    pub require_nickname: bool,
    /// Connection password checked against `PASS`, if set.
    #[serde(default)]
    pub password: Option<String>,
    /// Keepalive interval in milliseconds.
    #[serde(default = "default_ping_time")]
    pub ping_time: u64,
    /// Load the `authentication` and `nickname` builtins at startup.
    #[serde(default = "default_true")]
    pub use_default_extensions: bool,
    /// Additional builtin extensions to load at startup.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Capabilities offered to clients during CAP negotiation.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl ServerConfig {
    /// Keepalive interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_millis(self.ping_time)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            hostname: default_hostname(),
            welcome_message: default_welcome_message(),
            require_nickname: false,
            password: None,
            ping_time: default_ping_time(),
            use_default_extensions: true,
            extensions: Vec::new(),
            capabilities: Vec::new(),
        }
    }
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:6667").
    #[serde(default = "default_listen_address")]
    pub address: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.hostname, "unknown.tld");
        assert_eq!(config.server.welcome_message, "Welcome to IRC");
        assert_eq!(config.server.ping_interval(), Duration::from_secs(60));
        assert!(config.server.use_default_extensions);
        assert!(!config.server.require_nickname);
        assert_eq!(config.listen.address, "127.0.0.1:6667");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
hostname = "irc.example.net"
ping_time = 100
extensions = ["capabilities", "ping"]
capabilities = ["multi-prefix", "sasl"]
password = "hunter2"

[listen]
address = "0.0.0.0:6697"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.hostname, "irc.example.net");
        assert_eq!(config.server.ping_interval(), Duration::from_millis(100));
        assert_eq!(config.server.extensions, vec!["capabilities", "ping"]);
        assert_eq!(config.server.capabilities, vec!["multi-prefix", "sasl"]);
        assert_eq!(config.server.password.as_deref(), Some("hunter2"));
        assert_eq!(config.listen.address, "0.0.0.0:6697");
    }

    #[test]
    fn shipped_example_parses() {
        let config: Config =
            toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert_eq!(config.server.hostname, "irc.example.net");
        assert!(config.server.password.is_none());
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nping_time = \"soon\"").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/ircdkit.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
