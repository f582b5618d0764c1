/// Error types for telemetry, stores, analysis and configuration
pub mod error;

/// Core data types: samples, thresholds, alerts
pub mod events;

/// Host telemetry providers
pub mod collectors;

/// Sample, threshold and alert stores
pub mod store;

/// Threshold alerting engine and its scheduler
pub mod alerts;

/// Log file analysis
pub mod analysis;

/// Summary report over stored alerts and samples
pub mod report;

/// Engine self-monitoring counters
pub mod monitoring;

/// Configuration management
pub mod config;

// Re-export commonly used types
pub use alerts::{AlertingEngine, MetricsScheduler, TickOutcome};
pub use analysis::{LogAnalysisResult, LogAnalyzer};
pub use error::{AnalysisError, ConfigError, StoreError, TelemetryError};
pub use report::SummaryReport;
