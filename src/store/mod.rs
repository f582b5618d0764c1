//! Persistence sinks used by the alerting engine
//!
//! The engine only talks to these traits. The in-memory implementations are
//! what the binary runs with; a database-backed sink would implement the same
//! traits.

use crate::error::StoreError;
use crate::events::{Alert, MetricType, Sample, ThresholdConfig, ThresholdUpdate};

pub mod alerts;
pub mod samples;
pub mod thresholds;

pub use alerts::MemoryAlertStore;
pub use samples::MemorySampleStore;
pub use thresholds::MemoryThresholdRegistry;

/// Append-only metric history with bounded retention
#[cfg_attr(test, mockall::automock)]
pub trait SampleStore: Send + Sync {
    /// Append a sample, evicting the oldest entries beyond the retention cap
    fn append(&self, sample: Sample) -> Result<(), StoreError>;

    /// Up to `limit` samples, newest first
    fn recent(&self, limit: usize) -> Result<Vec<Sample>, StoreError>;

    /// Most recent sample of one metric type
    fn latest(&self, metric_type: MetricType) -> Result<Option<Sample>, StoreError>;
}

/// Per metric-type threshold configuration
#[cfg_attr(test, mockall::automock)]
pub trait ThresholdRegistry: Send + Sync {
    fn get(&self, metric_type: MetricType) -> Result<Option<ThresholdConfig>, StoreError>;

    /// Apply a partial update and return the resulting configuration
    fn set(
        &self,
        metric_type: MetricType,
        update: ThresholdUpdate,
    ) -> Result<ThresholdConfig, StoreError>;

    /// All configured thresholds, in metric type order
    fn list(&self) -> Result<Vec<ThresholdConfig>, StoreError>;
}

/// Emitted alerts
#[cfg_attr(test, mockall::automock)]
pub trait AlertStore: Send + Sync {
    fn append(&self, alert: Alert) -> Result<(), StoreError>;

    /// All alerts, newest first
    fn list(&self) -> Result<Vec<Alert>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<Alert>, StoreError>;

    /// Mark an alert as acknowledged; acknowledging twice is not an error
    fn acknowledge(&self, id: &str) -> Result<(), StoreError>;

    /// Remove every alert
    fn clear(&self) -> Result<(), StoreError>;
}
