//! Threshold evaluation for a single metric value

use crate::events::{MetricType, Severity, ThresholdConfig};

/// Outcome of comparing a value against its thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breach {
    pub severity: Severity,
    /// The bound that was reached
    pub threshold: f64,
}

/// Compare a stored value against its threshold configuration
///
/// Critical is checked first, so with inverted bounds a value at or above
/// `critical` is still reported as critical.
pub fn evaluate(value: f64, config: &ThresholdConfig) -> Option<Breach> {
    if value >= config.critical {
        Some(Breach {
            severity: Severity::Critical,
            threshold: config.critical,
        })
    } else if value >= config.warning {
        Some(Breach {
            severity: Severity::Warning,
            threshold: config.warning,
        })
    } else {
        None
    }
}

/// Build the human-readable alert message, e.g. `CPU usage critical: 85%`
pub fn alert_message(metric_type: MetricType, severity: Severity, value: f64) -> String {
    let state = match severity {
        Severity::Critical => "critical",
        Severity::Warning => "elevated",
        Severity::Info => "normal",
    };
    format!("{} usage {}: {}%", metric_type.label(), state, value)
}
