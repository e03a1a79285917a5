//! Dashboard configuration file.
//!
//! ```toml
//! [endpoint]
//! url = "http://127.0.0.1:8080/api/readings"
//! timeout_secs = 10
//!
//! [polling]
//! live_interval_secs = 5
//! chart_interval_secs = 10
//!
//! [history]
//! live_capacity = 200
//! chart_window = 50
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sensordash_core::{CHART_WINDOW, DashboardOptions, LIVE_CAPACITY, SchedulerOptions};

/// Default readings endpoint.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/api/readings";

/// Minimum poll interval in seconds.
pub const MIN_INTERVAL: u64 = 1;
/// Maximum poll interval in seconds (1 hour).
pub const MAX_INTERVAL: u64 = 3600;
/// Maximum request timeout in seconds.
pub const MAX_TIMEOUT: u64 = 300;

/// Dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where readings are fetched from.
    pub endpoint: EndpointConfig,
    /// Timer cadences.
    pub polling: PollingConfig,
    /// History sizes.
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, collecting every problem found.
    ///
    /// # Example
    ///
    /// ```
    /// use sensordash_cli::config::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.endpoint.validate());
        errors.extend(self.polling.validate());
        errors.extend(self.history.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Dashboard sizing derived from the `[history]` section.
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            live_capacity: self.history.live_capacity,
            chart_window: self.history.chart_window,
            ..Default::default()
        }
    }

    /// Scheduler cadences derived from the `[polling]` section.
    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            live_interval: Duration::from_secs(self.polling.live_interval_secs),
            chart_interval: Duration::from_secs(self.polling.chart_interval_secs),
        }
    }
}

/// Endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Readings URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl EndpointConfig {
    /// Validate endpoint settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.url.is_empty() {
            errors.push(ValidationError {
                field: "endpoint.url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            errors.push(ValidationError {
                field: "endpoint.url".to_string(),
                message: format!("invalid URL '{}': must start with http:// or https://", self.url),
            });
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT {
            errors.push(ValidationError {
                field: "endpoint.timeout_secs".to_string(),
                message: format!(
                    "timeout {} is out of range (1-{} seconds)",
                    self.timeout_secs, MAX_TIMEOUT
                ),
            });
        }

        errors
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Timer cadences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Live aggregator interval in seconds.
    pub live_interval_secs: u64,
    /// Chart aggregator interval in seconds.
    pub chart_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            live_interval_secs: 5,
            chart_interval_secs: 10,
        }
    }
}

impl PollingConfig {
    /// Validate polling settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (field, value) in [
            ("polling.live_interval_secs", self.live_interval_secs),
            ("polling.chart_interval_secs", self.chart_interval_secs),
        ] {
            if value < MIN_INTERVAL {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "interval {} is too short (minimum {} second)",
                        value, MIN_INTERVAL
                    ),
                });
            } else if value > MAX_INTERVAL {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "interval {} is too long (maximum {} seconds / 1 hour)",
                        value, MAX_INTERVAL
                    ),
                });
            }
        }
        errors
    }
}

/// History sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum live readings kept per kind.
    pub live_capacity: usize,
    /// Chart window size per kind.
    pub chart_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            live_capacity: LIVE_CAPACITY,
            chart_window: CHART_WINDOW,
        }
    }
}

impl HistoryConfig {
    /// Validate history settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.live_capacity == 0 {
            errors.push(ValidationError {
                field: "history.live_capacity".to_string(),
                message: "capacity must be at least 1".to_string(),
            });
        }
        if self.chart_window == 0 {
            errors.push(ValidationError {
                field: "history.chart_window".to_string(),
                message: "window must be at least 1".to_string(),
            });
        }
        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `polling.live_interval_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensordash")
        .join("config.toml")
}
