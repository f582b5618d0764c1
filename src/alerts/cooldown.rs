use crate::events::{MetricType, Timestamp};
use chrono::Duration;
use std::collections::HashMap;

/// Per metric-type alert cooldown
///
/// Remembers when the last alert of each metric type was emitted. A new alert
/// of the same type is allowed only once strictly more than the cooldown has
/// elapsed, whatever its severity.
#[derive(Debug)]
pub struct CooldownTracker {
    /// Minimum time between two alerts of one type
    cooldown: Duration,
    /// Time of the last emitted alert per type
    last_emitted: HashMap<MetricType, Timestamp>,
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(Duration::seconds(60))
    }
}

impl CooldownTracker {
    /// Create a tracker with the given cooldown window
    ///
    /// # Arguments
    ///
    /// * `cooldown` - Minimum time between two alerts of the same metric type
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_emitted: HashMap::new(),
        }
    }

    /// Check whether an alert of `metric_type` may be emitted at `now`
    pub fn can_emit_at(&self, metric_type: MetricType, now: Timestamp) -> bool {
        match self.last_emitted.get(&metric_type) {
            Some(last) => now - *last > self.cooldown,
            None => true,
        }
    }

    /// Record that an alert of `metric_type` was emitted at `timestamp`
    pub fn record_at(&mut self, metric_type: MetricType, timestamp: Timestamp) {
        self.last_emitted.insert(metric_type, timestamp);
    }

    /// Time of the last emitted alert of `metric_type`, if any
    pub fn last_emitted(&self, metric_type: MetricType) -> Option<Timestamp> {
        self.last_emitted.get(&metric_type).copied()
    }
}
