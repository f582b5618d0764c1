//! Self-monitoring counters for the alerting engine
//!
//! The engine records every tick outcome here so the binary can report how the
//! run went when it shuts down.

use log::info;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals, updated lock-free from the tick path
#[derive(Debug, Default)]
pub struct TickStats {
    ticks_completed: AtomicU64,
    ticks_skipped: AtomicU64,
    alerts_emitted: AtomicU64,
    persistence_failures: AtomicU64,
}

/// Point-in-time copy of [`TickStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickStatsSnapshot {
    pub ticks_completed: u64,
    pub ticks_skipped: u64,
    pub alerts_emitted: u64,
    pub persistence_failures: u64,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tick that sampled telemetry and evaluated thresholds
    pub fn record_completed(&self, alerts_emitted: u64, persistence_failures: u64) {
        self.ticks_completed.fetch_add(1, Ordering::Relaxed);
        self.alerts_emitted
            .fetch_add(alerts_emitted, Ordering::Relaxed);
        self.persistence_failures
            .fetch_add(persistence_failures, Ordering::Relaxed);
    }

    /// Record a tick abandoned before any write
    pub fn record_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TickStatsSnapshot {
        TickStatsSnapshot {
            ticks_completed: self.ticks_completed.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
            alerts_emitted: self.alerts_emitted.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }

    /// Log a one-line summary of the counters
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            "Engine stats: {} ticks completed, {} skipped, {} alerts emitted, {} persistence failures",
            snapshot.ticks_completed,
            snapshot.ticks_skipped,
            snapshot.alerts_emitted,
            snapshot.persistence_failures
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_accumulate() {
        let stats = TickStats::new();
        stats.record_completed(2, 0);
        stats.record_completed(0, 1);
        stats.record_skipped();

        assert_eq!(
            stats.snapshot(),
            TickStatsSnapshot {
                ticks_completed: 2,
                ticks_skipped: 1,
                alerts_emitted: 2,
                persistence_failures: 1,
            }
        );
    }

    #[test]
    fn test_concurrent_updates() {
        let stats = Arc::new(TickStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record_completed(1, 0);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.ticks_completed, 1000);
        assert_eq!(snapshot.alerts_emitted, 1000);
    }

    #[test]
    fn test_snapshot_serialization() {
        let json = serde_json::to_value(TickStats::new().snapshot()).unwrap();
        assert_eq!(json["ticksCompleted"], 0);
        assert_eq!(json["persistenceFailures"], 0);
    }
}
