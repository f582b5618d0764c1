use crate::events::MetricType;
use thiserror::Error;

/// Errors that can occur while reading host telemetry
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Telemetry source unavailable: {0}")]
    Unavailable(String),

    #[error("Telemetry request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid telemetry reading: {0}")]
    InvalidReading(String),
}

/// Errors that can occur in the sample, alert and threshold stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("No threshold configured for {0}")]
    ThresholdNotFound(MetricType),

    #[error("Invalid threshold value: {0}")]
    InvalidThreshold(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),
}

/// Errors that can occur when ingesting a log file for analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Log file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned(err.to_string())
    }
}
