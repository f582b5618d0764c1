//! Core data types shared by the alerting and log analysis engines
//!
//! This module defines the metric samples, threshold configurations and alerts
//! that flow between the telemetry provider, the stores and the alerting engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// Kind of host resource being sampled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    /// Global CPU utilization
    Cpu,
    /// Physical memory utilization
    Memory,
}

impl MetricType {
    /// Every metric type, in evaluation order
    pub const ALL: [MetricType; 2] = [MetricType::Cpu, MetricType::Memory];

    /// Human-readable label used in alert messages
    pub fn label(&self) -> &'static str {
        match self {
            MetricType::Cpu => "CPU",
            MetricType::Memory => "Memory",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricType::Cpu => write!(f, "CPU"),
            MetricType::Memory => write!(f, "MEMORY"),
        }
    }
}

/// Round a raw percentage into the stored representation
///
/// Values are clamped into `0..=100` and rounded to one decimal place. This is
/// the only place rounding happens; everything downstream compares and displays
/// the stored value as-is.
pub fn round_percent(raw: f64) -> f64 {
    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// A single utilization reading for one metric type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Percentage in `0..=100` with one decimal digit
    pub value: f64,
    pub timestamp: Timestamp,
}

impl Sample {
    /// Create a sample from a raw reading, rounding it to one decimal place
    pub fn new(metric_type: MetricType, raw_value: f64, timestamp: Timestamp) -> Self {
        Self {
            metric_type,
            value: round_percent(raw_value),
            timestamp,
        }
    }
}

/// Warning and critical bounds for one metric type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub warning: f64,
    pub critical: f64,
    pub updated_at: Timestamp,
}

/// Partial update for a threshold configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ThresholdUpdate {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
}

/// Severity level of an emitted alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational; reserved for manual use, never emitted by the engine
    Info,
    /// Value crossed the warning bound
    Warning,
    /// Value crossed the critical bound
    Critical,
}

/// A threshold crossing recorded by the alerting engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub severity: Severity,
    pub message: String,
    /// Sampled value that crossed the bound
    pub value: f64,
    /// The bound that was crossed
    pub threshold_crossed: f64,
    pub timestamp: Timestamp,
    pub acknowledged: bool,
}

impl Alert {
    /// Create a new unacknowledged alert with a fresh identifier
    pub fn new(
        metric_type: MetricType,
        severity: Severity,
        message: String,
        value: f64,
        threshold_crossed: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            metric_type,
            severity,
            message,
            value,
            threshold_crossed,
            timestamp,
            acknowledged: false,
        }
    }
}

/// Latest readings with their change since the previous tick
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMetrics {
    pub cpu: f64,
    pub memory: f64,
    pub cpu_trend: f64,
    pub memory_trend: f64,
}
