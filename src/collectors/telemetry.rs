use crate::error::TelemetryError;
use log::{debug, info};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use tokio::time::Instant;

/// Raw host utilization as reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Global CPU utilization, 0-100
    pub cpu_percent: f64,
    /// Used physical memory over total physical memory, 0-100
    pub memory_percent: f64,
}

impl TelemetrySnapshot {
    /// Reject readings that cannot be turned into samples
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidReading` if either value is NaN or infinite.
    pub fn validate(self) -> Result<Self, TelemetryError> {
        for (name, value) in [("cpu", self.cpu_percent), ("memory", self.memory_percent)] {
            if !value.is_finite() {
                return Err(TelemetryError::InvalidReading(format!(
                    "{} reading is not a finite number: {}",
                    name, value
                )));
            }
        }
        Ok(self)
    }
}

/// Source of host CPU and memory utilization
///
/// Implementations may block on the operating system; callers are expected to
/// bound each call with a timeout.
pub trait TelemetryProvider: Send + Sync {
    fn sample<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<TelemetrySnapshot, TelemetryError>> + Send + 'a>>;
}

/// Telemetry provider backed by `sysinfo`
///
/// CPU usage is computed by `sysinfo` as the delta between two refreshes, so the
/// system is refreshed once at construction and every snapshot reports usage
/// since the previous one. The first snapshot waits until
/// `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` has passed since construction.
pub struct SystemTelemetry {
    system: Arc<Mutex<System>>,
    /// Earliest instant at which a CPU delta is meaningful
    ready_at: Instant,
}

impl SystemTelemetry {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        let system = System::new_with_specifics(refresh_kind);
        info!(
            "System telemetry initialized ({} bytes physical memory)",
            system.total_memory()
        );

        Self {
            system: Arc::new(Mutex::new(system)),
            ready_at: Instant::now() + sysinfo::MINIMUM_CPU_UPDATE_INTERVAL,
        }
    }

    /// Time left before the first CPU reading is meaningful
    pub fn warm_up_remaining(&self) -> Duration {
        self.ready_at.saturating_duration_since(Instant::now())
    }

    fn read(system: &Mutex<System>) -> Result<TelemetrySnapshot, TelemetryError> {
        // A read that outlived its timeout still holds the handle
        let mut system = match system.try_lock() {
            Ok(system) => system,
            Err(TryLockError::WouldBlock) => {
                return Err(TelemetryError::Unavailable(
                    "previous read still in flight".to_string(),
                ))
            }
            Err(TryLockError::Poisoned(e)) => {
                return Err(TelemetryError::Unavailable(format!(
                    "system handle poisoned: {}",
                    e
                )))
            }
        };

        system.refresh_cpu_usage();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(TelemetryError::Unavailable(
                "total memory reported as zero".to_string(),
            ));
        }

        let snapshot = TelemetrySnapshot {
            cpu_percent: system.global_cpu_usage() as f64,
            memory_percent: system.used_memory() as f64 / total as f64 * 100.0,
        };
        debug!(
            "Telemetry snapshot: cpu={:.2}%, memory={:.2}%",
            snapshot.cpu_percent, snapshot.memory_percent
        );

        snapshot.validate()
    }
}

impl Default for SystemTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryProvider for SystemTelemetry {
    fn sample<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<TelemetrySnapshot, TelemetryError>> + Send + 'a>> {
        let system = Arc::clone(&self.system);
        let ready_at = self.ready_at;
        Box::pin(async move {
            if Instant::now() < ready_at {
                debug!("Waiting for initial CPU measurement interval");
                tokio::time::sleep_until(ready_at).await;
            }
            tokio::task::spawn_blocking(move || Self::read(&system))
                .await
                .map_err(|e| TelemetryError::Unavailable(format!("telemetry task failed: {}", e)))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_finite_values() {
        let snapshot = TelemetrySnapshot {
            cpu_percent: 12.5,
            memory_percent: 99.9,
        };
        assert_eq!(snapshot.validate().unwrap(), snapshot);
    }

    #[test]
    fn test_validate_rejects_nan() {
        let snapshot = TelemetrySnapshot {
            cpu_percent: f64::NAN,
            memory_percent: 40.0,
        };
        assert!(matches!(
            snapshot.validate(),
            Err(TelemetryError::InvalidReading(_))
        ));

        let snapshot = TelemetrySnapshot {
            cpu_percent: 40.0,
            memory_percent: f64::INFINITY,
        };
        assert!(snapshot.validate().is_err());
    }

    #[tokio::test]
    async fn test_system_telemetry_reads_host() {
        let telemetry = SystemTelemetry::new();
        match telemetry.sample().await {
            Ok(snapshot) => {
                assert!(snapshot.cpu_percent >= 0.0);
                assert!((0.0..=100.0).contains(&snapshot.memory_percent));
            }
            // Sandboxed hosts may not expose memory information
            Err(TelemetryError::Unavailable(_)) => {}
            Err(e) => panic!("unexpected telemetry error: {}", e),
        }
    }

    #[tokio::test]
    async fn test_first_sample_waits_for_cpu_interval() {
        let telemetry = SystemTelemetry::new();
        assert!(telemetry.warm_up_remaining() > Duration::ZERO);
        assert!(telemetry.warm_up_remaining() <= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

        let started = Instant::now();
        let _ = telemetry.sample().await;
        let warm_up = telemetry.ready_at.saturating_duration_since(started);
        assert!(started.elapsed() >= warm_up);
        assert_eq!(telemetry.warm_up_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_read_rejects_concurrent_read() {
        let telemetry = SystemTelemetry::new();
        let _held = telemetry.system.lock().unwrap();

        match SystemTelemetry::read(&telemetry.system) {
            Err(TelemetryError::Unavailable(reason)) => {
                assert_eq!(reason, "previous read still in flight")
            }
            other => panic!("expected unavailable, got {:?}", other),
        }
    }
}
