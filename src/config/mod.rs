//! Configuration loading for hostwatch
//!
//! Every section is optional in the TOML file; missing fields fall back to the
//! defaults below.

use crate::error::ConfigError;
use crate::events::MetricType;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub retention: RetentionConfig,
    pub thresholds: ThresholdsConfig,
    pub analysis: AnalysisConfig,
}

/// Tick scheduling and alert cooldown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between two ticks
    pub interval_seconds: u64,
    /// Minimum seconds between two alerts of the same metric type
    pub cooldown_seconds: u64,
    /// Upper bound for a single telemetry read
    pub telemetry_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            cooldown_seconds: 60,
            telemetry_timeout_ms: 2000,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_seconds as i64)
    }

    pub fn telemetry_timeout(&self) -> Duration {
        Duration::from_millis(self.telemetry_timeout_ms)
    }
}

/// Sample history limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum number of samples kept in the history
    pub max_samples: usize,
    /// Number of samples returned by a history listing
    pub history_limit: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_samples: 1000,
            history_limit: 100,
        }
    }
}

/// Initial warning/critical bounds for one metric type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub warning: f64,
    pub critical: f64,
}

/// Initial threshold registry contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub cpu: ThresholdBounds,
    pub memory: ThresholdBounds,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            cpu: ThresholdBounds {
                warning: 60.0,
                critical: 80.0,
            },
            memory: ThresholdBounds {
                warning: 70.0,
                critical: 85.0,
            },
        }
    }
}

impl ThresholdsConfig {
    pub fn bounds(&self, metric_type: MetricType) -> ThresholdBounds {
        match metric_type {
            MetricType::Cpu => self.cpu,
            MetricType::Memory => self.memory,
        }
    }
}

/// Log file ingestion limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest log file accepted for analysis, in bytes
    pub max_file_bytes: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the engine
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "monitor.interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.monitor.telemetry_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "monitor.telemetry_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.monitor.telemetry_timeout() >= self.monitor.interval() {
            return Err(ConfigError::ValidationError(format!(
                "monitor.telemetry_timeout_ms ({}) must be shorter than the tick interval ({}s)",
                self.monitor.telemetry_timeout_ms, self.monitor.interval_seconds
            )));
        }
        if self.retention.max_samples == 0 {
            return Err(ConfigError::ValidationError(
                "retention.max_samples must be greater than 0".to_string(),
            ));
        }

        for metric_type in MetricType::ALL {
            let bounds = self.thresholds.bounds(metric_type);
            for (name, value) in [("warning", bounds.warning), ("critical", bounds.critical)] {
                if !(0.0..=100.0).contains(&value) {
                    return Err(ConfigError::ValidationError(format!(
                        "{} {} threshold must be between 0 and 100, got {}",
                        metric_type, name, value
                    )));
                }
            }
            if bounds.warning >= bounds.critical {
                warn!(
                    "{} warning threshold ({}) is not below critical ({}); critical takes precedence",
                    metric_type, bounds.warning, bounds.critical
                );
            }
        }

        Ok(())
    }
}
