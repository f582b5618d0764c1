//! Summary of alert activity and recent utilization

use crate::error::StoreError;
use crate::events::{MetricType, Timestamp};
use crate::store::{AlertStore, SampleStore};
use serde::{Deserialize, Serialize};

/// Number of alerts listed in [`SummaryReport::recent_alerts`]
pub const RECENT_ALERTS_LIMIT: usize = 10;

/// Number of most recent samples averaged, across all metric types
pub const AVERAGE_WINDOW: usize = 10;

/// Value per metric type, serialized as `{"CPU": .., "MEMORY": ..}`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PerMetric<T> {
    #[serde(rename = "CPU")]
    pub cpu: T,
    #[serde(rename = "MEMORY")]
    pub memory: T,
}

impl<T> PerMetric<T> {
    pub fn get(&self, metric_type: MetricType) -> &T {
        match metric_type {
            MetricType::Cpu => &self.cpu,
            MetricType::Memory => &self.memory,
        }
    }
}

/// Condensed view of one alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentAlert {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub timestamp: Timestamp,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_alerts: usize,
    pub breakdown: PerMetric<usize>,
    /// Newest first
    pub recent_alerts: Vec<RecentAlert>,
    /// Averages over the most recent samples, one decimal place
    pub average_metrics: PerMetric<f64>,
    pub generated_at: Timestamp,
}

impl SummaryReport {
    /// Build a report from the current store contents
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either store cannot be read.
    pub fn build(
        alerts: &dyn AlertStore,
        samples: &dyn SampleStore,
        now: Timestamp,
    ) -> Result<Self, StoreError> {
        let alerts = alerts.list()?;
        let recent_samples = samples.recent(AVERAGE_WINDOW)?;

        let count_of = |metric_type: MetricType| {
            alerts
                .iter()
                .filter(|alert| alert.metric_type == metric_type)
                .count()
        };

        let average_of = |metric_type: MetricType| {
            let values: Vec<f64> = recent_samples
                .iter()
                .filter(|sample| sample.metric_type == metric_type)
                .map(|sample| sample.value)
                .collect();
            if values.is_empty() {
                0.0
            } else {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (mean * 10.0).round() / 10.0
            }
        };

        Ok(Self {
            total_alerts: alerts.len(),
            breakdown: PerMetric {
                cpu: count_of(MetricType::Cpu),
                memory: count_of(MetricType::Memory),
            },
            recent_alerts: alerts
                .iter()
                .take(RECENT_ALERTS_LIMIT)
                .map(|alert| RecentAlert {
                    metric_type: alert.metric_type,
                    timestamp: alert.timestamp,
                    value: alert.value,
                })
                .collect(),
            average_metrics: PerMetric {
                cpu: average_of(MetricType::Cpu),
                memory: average_of(MetricType::Memory),
            },
            generated_at: now,
        })
    }
}
