//! Configuration file parsing and structures.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

/// Top-level configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub vesync: VesyncConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default)]
    pub level: LogLevel,
}

/// Vendor cloud account and polling cadence
#[derive(Debug, Deserialize)]
pub struct VesyncConfig {
    pub username: String,

    pub password: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between vendor polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Minimum seconds between externally requested refreshes. The first
    /// request always goes through.
    #[serde(default = "default_debounce_cooldown_secs")]
    pub debounce_cooldown_secs: u64,
}

impl VesyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn debounce_cooldown(&self) -> Duration {
        Duration::from_secs(self.debounce_cooldown_secs)
    }
}

fn default_base_url() -> String {
    "https://smartapi.vesync.com".to_string()
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_debounce_cooldown_secs() -> u64 {
    15
}

/// HTTP status API configuration
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,

    #[serde(default = "default_api_listen")]
    pub listen: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            enabled: default_api_enabled(),
            listen: default_api_listen(),
            port: default_api_port(),
        }
    }
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8565
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().to_path_buf(), e))?;

        toml::from_str(&contents).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [vesync]
            username = "user@example.com"
            password = "hunter2"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.vesync.base_url, "https://smartapi.vesync.com");
        assert_eq!(config.vesync.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.vesync.debounce_cooldown(), Duration::from_secs(15));
        assert!(config.api.enabled);
        assert_eq!(config.api.port, 8565);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [logging]
            level = "debug"

            [vesync]
            username = "user@example.com"
            password = "hunter2"
            base_url = "http://localhost:9000"
            poll_interval_secs = 30
            debounce_cooldown_secs = 60

            [api]
            enabled = false
            listen = "0.0.0.0"
            port = 9565
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.vesync.base_url, "http://localhost:9000");
        assert_eq!(config.vesync.poll_interval(), Duration::from_secs(30));
        assert!(!config.api.enabled);
        assert_eq!(config.api.listen, "0.0.0.0");
    }

    #[test]
    fn test_missing_credentials_fail_to_parse() {
        let toml = r#"
            [vesync]
            username = "user@example.com"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [vesync]
            username = "user@example.com"
            password = "hunter2"
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.vesync.username, "user@example.com");

        assert!(matches!(
            Config::from_file("/nonexistent/vesyncd.toml"),
            Err(ConfigError::Io(..))
        ));
    }
}
