use crate::config::ThresholdsConfig;
use crate::error::StoreError;
use crate::events::{MetricType, ThresholdConfig, ThresholdUpdate};
use crate::store::ThresholdRegistry;
use chrono::Utc;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Threshold registry holding one live configuration per metric type
#[derive(Debug, Default)]
pub struct MemoryThresholdRegistry {
    configs: RwLock<BTreeMap<MetricType, ThresholdConfig>>,
}

impl MemoryThresholdRegistry {
    /// Create a registry with no thresholds; every type is skipped by the engine
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry seeded from configuration
    pub fn from_config(thresholds: &ThresholdsConfig) -> Self {
        let now = Utc::now();
        let configs = MetricType::ALL
            .into_iter()
            .map(|metric_type| {
                let bounds = thresholds.bounds(metric_type);
                (
                    metric_type,
                    ThresholdConfig {
                        metric_type,
                        warning: bounds.warning,
                        critical: bounds.critical,
                        updated_at: now,
                    },
                )
            })
            .collect();

        Self {
            configs: RwLock::new(configs),
        }
    }

    fn check_bound(name: &str, value: Option<f64>) -> Result<(), StoreError> {
        match value {
            Some(v) if !(0.0..=100.0).contains(&v) => Err(StoreError::InvalidThreshold(format!(
                "{} must be between 0 and 100, got {}",
                name, v
            ))),
            _ => Ok(()),
        }
    }
}

impl ThresholdRegistry for MemoryThresholdRegistry {
    fn get(&self, metric_type: MetricType) -> Result<Option<ThresholdConfig>, StoreError> {
        Ok(self.configs.read()?.get(&metric_type).cloned())
    }

    fn set(
        &self,
        metric_type: MetricType,
        update: ThresholdUpdate,
    ) -> Result<ThresholdConfig, StoreError> {
        Self::check_bound("warning", update.warning)?;
        Self::check_bound("critical", update.critical)?;

        let mut configs = self.configs.write()?;
        let updated = match configs.get(&metric_type) {
            Some(existing) => ThresholdConfig {
                metric_type,
                warning: update.warning.unwrap_or(existing.warning),
                critical: update.critical.unwrap_or(existing.critical),
                updated_at: Utc::now(),
            },
            None => match (update.warning, update.critical) {
                (Some(warning), Some(critical)) => ThresholdConfig {
                    metric_type,
                    warning,
                    critical,
                    updated_at: Utc::now(),
                },
                _ => return Err(StoreError::ThresholdNotFound(metric_type)),
            },
        };

        if updated.warning >= updated.critical {
            warn!(
                "{} warning threshold ({}) is not below critical ({}); critical takes precedence",
                metric_type, updated.warning, updated.critical
            );
        }

        configs.insert(metric_type, updated.clone());
        info!(
            "Updated {} thresholds: warning={}, critical={}",
            metric_type, updated.warning, updated.critical
        );
        Ok(updated)
    }

    fn list(&self) -> Result<Vec<ThresholdConfig>, StoreError> {
        Ok(self.configs.read()?.values().cloned().collect())
    }
}
