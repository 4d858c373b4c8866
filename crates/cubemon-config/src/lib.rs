//! Configuration management for cubemon
//!
//! This module handles loading, validation, and management of
//! cubemon configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Synthetic data settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Number of transaction records generated at startup
    #[serde(default = "default_record_count")]
    pub record_count: usize,
    /// Window (in days, ending now) in which creation times fall
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    /// Fixed RNG seed for reproducible data
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            record_count: default_record_count(),
            days_back: default_days_back(),
            seed: None,
        }
    }
}

fn default_record_count() -> usize {
    300
}

fn default_days_back() -> u32 {
    30
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for the transaction table
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    20
}

/// Login form behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Simulated network delay after a valid submission, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Minutes a session stays valid after login
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u32,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            session_ttl_minutes: default_session_ttl_minutes(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_session_ttl_minutes() -> u32 {
    480
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Show the status selector and apply the status criterion
    #[serde(default = "default_true")]
    pub status_filter: bool,
    /// Show the date picker and apply the date criterion
    #[serde(default = "default_true")]
    pub date_filter: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            status_filter: true,
            date_filter: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Synthetic data settings
    #[serde(default)]
    pub data: DataConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Login settings
    #[serde(default)]
    pub login: LoginConfig,
    /// Feature toggles
    #[serde(default)]
    pub features: FeaturesConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One week
const MAX_SESSION_TTL_MINUTES: u32 = 7 * 24 * 60;

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 || self.pagination.records_per_page > 500 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be between 1 and 500".to_string(),
            });
        }

        if self.data.record_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "data.record_count".to_string(),
                reason: "Record count must be greater than 0".to_string(),
            });
        }

        if self.data.days_back == 0 {
            return Err(ConfigError::InvalidValue {
                field: "data.days_back".to_string(),
                reason: "Days back must be greater than 0".to_string(),
            });
        }

        if self.login.session_ttl_minutes == 0 || self.login.session_ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(ConfigError::InvalidValue {
                field: "login.session_ttl_minutes".to_string(),
                reason: format!(
                    "Session lifetime must be between 1 and {} minutes",
                    MAX_SESSION_TTL_MINUTES
                ),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.pagination.records_per_page, 20);
        assert_eq!(config.data.record_count, 300);
        assert_eq!(config.data.days_back, 30);
        assert_eq!(config.login.delay_ms, 1000);
        assert_eq!(config.login.session_ttl_minutes, 480);
        assert!(config.features.status_filter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\ndata:\n  seed: 7\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.data.seed, Some(7));
        assert_eq!(config.data.record_count, 300);
    }

    #[test]
    fn test_bundled_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.pagination.records_per_page, 20);
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::InvalidYaml)));
    }

    #[test]
    fn test_validate_page_size() {
        let mut config = Config::default();
        config.pagination.records_per_page = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "pagination.records_per_page")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_session_ttl() {
        let mut config = Config::default();
        config.login.session_ttl_minutes = 0;
        assert!(config.validate().is_err());
        config.login.session_ttl_minutes = 7 * 24 * 60 + 1;
        assert!(config.validate().is_err());
        config.login.session_ttl_minutes = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::FileNotFound);
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 3000;
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }
}
