use crate::alerts::cooldown::CooldownTracker;
use crate::alerts::threshold::{alert_message, evaluate};
use crate::collectors::{TelemetryProvider, TelemetrySnapshot};
use crate::error::{StoreError, TelemetryError};
use crate::events::{Alert, CurrentMetrics, MetricType, Sample, Timestamp};
use crate::monitoring::{TickStats, TickStatsSnapshot};
use crate::store::{AlertStore, SampleStore, ThresholdRegistry};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default upper bound for one telemetry read
pub const DEFAULT_TELEMETRY_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Telemetry could not be read; nothing was written
    Skipped { reason: String },
    /// Samples were recorded and thresholds evaluated
    Completed {
        cpu: f64,
        memory: f64,
        alerts_emitted: usize,
        persistence_failures: usize,
    },
}

/// Process-local engine state, never persisted
#[derive(Debug)]
struct EngineState {
    cooldown: CooldownTracker,
    /// Value recorded by the most recent tick
    last_recorded: HashMap<MetricType, f64>,
    /// Value recorded by the tick before it, used as the trend baseline
    previous: HashMap<MetricType, f64>,
}

impl EngineState {
    fn record_value(&mut self, metric_type: MetricType, value: f64) {
        match self.last_recorded.insert(metric_type, value) {
            Some(prior) => {
                self.previous.insert(metric_type, prior);
            }
            None => {
                self.previous.remove(&metric_type);
            }
        }
    }
}

/// Threshold alerting engine
///
/// Each tick reads one telemetry snapshot, records a sample per metric type,
/// compares it to the configured thresholds and emits at most one alert per
/// metric type per cooldown window.
pub struct AlertingEngine {
    provider: Arc<dyn TelemetryProvider>,
    samples: Arc<dyn SampleStore>,
    thresholds: Arc<dyn ThresholdRegistry>,
    alerts: Arc<dyn AlertStore>,
    telemetry_timeout: Duration,
    state: Mutex<EngineState>,
    /// Serializes ticks so a manual tick never overlaps a scheduled one
    tick_lock: tokio::sync::Mutex<()>,
    stats: TickStats,
}

impl AlertingEngine {
    /// Create an engine with the default 60 s cooldown and 2 s telemetry timeout
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of CPU and memory readings
    /// * `samples` - Sink for recorded samples
    /// * `thresholds` - Per metric-type warning/critical bounds
    /// * `alerts` - Sink for emitted alerts
    pub fn new(
        provider: Arc<dyn TelemetryProvider>,
        samples: Arc<dyn SampleStore>,
        thresholds: Arc<dyn ThresholdRegistry>,
        alerts: Arc<dyn AlertStore>,
    ) -> Self {
        Self {
            provider,
            samples,
            thresholds,
            alerts,
            telemetry_timeout: DEFAULT_TELEMETRY_TIMEOUT,
            state: Mutex::new(EngineState {
                cooldown: CooldownTracker::default(),
                last_recorded: HashMap::new(),
                previous: HashMap::new(),
            }),
            tick_lock: tokio::sync::Mutex::new(()),
            stats: TickStats::new(),
        }
    }

    /// Override the cooldown window and the telemetry timeout
    pub fn with_settings(
        mut self,
        cooldown: chrono::Duration,
        telemetry_timeout: Duration,
    ) -> Self {
        self.state = Mutex::new(EngineState {
            cooldown: CooldownTracker::new(cooldown),
            last_recorded: HashMap::new(),
            previous: HashMap::new(),
        });
        self.telemetry_timeout = telemetry_timeout;
        self
    }

    /// Run one tick stamped with the current time
    pub async fn tick(&self) -> TickOutcome {
        self.tick_at(Utc::now()).await
    }

    /// Run one tick stamped with `now`
    ///
    /// Never fails: telemetry errors skip the tick and store errors are logged
    /// and counted in the outcome.
    pub async fn tick_at(&self, now: Timestamp) -> TickOutcome {
        let _guard = self.tick_lock.lock().await;

        let snapshot = match self.read_telemetry().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Skipping tick: {}", e);
                self.stats.record_skipped();
                return TickOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        let cpu = Sample::new(MetricType::Cpu, snapshot.cpu_percent, now);
        let memory = Sample::new(MetricType::Memory, snapshot.memory_percent, now);
        debug!(
            "Tick at {}: cpu={}%, memory={}%",
            now, cpu.value, memory.value
        );

        let mut alerts_emitted = 0;
        let mut persistence_failures = 0;
        let (cpu_value, memory_value) = (cpu.value, memory.value);

        let mut state = self.lock_state();
        for sample in [cpu, memory] {
            let metric_type = sample.metric_type;
            let value = sample.value;

            if let Err(e) = self.samples.append(sample) {
                error!("Failed to record {} sample: {}", metric_type, e);
                persistence_failures += 1;
            }

            match self.evaluate_metric(&mut state, metric_type, value, now) {
                Ok(true) => alerts_emitted += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("Failed to evaluate {} alert: {}", metric_type, e);
                    persistence_failures += 1;
                }
            }

            state.record_value(metric_type, value);
        }
        drop(state);

        self.stats
            .record_completed(alerts_emitted as u64, persistence_failures as u64);

        TickOutcome::Completed {
            cpu: cpu_value,
            memory: memory_value,
            alerts_emitted,
            persistence_failures,
        }
    }

    /// Latest stored value per metric type with its change since the previous tick
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the sample store cannot be read.
    pub fn current_metrics(&self) -> Result<CurrentMetrics, StoreError> {
        // Ticks append samples under the state lock, so holding it here keeps
        // both readings and the baseline from the same tick
        let state = self.lock_state();
        let cpu = self.latest_value(MetricType::Cpu)?;
        let memory = self.latest_value(MetricType::Memory)?;

        let baseline = |metric_type: MetricType| {
            state
                .previous
                .get(&metric_type)
                .copied()
                .unwrap_or(0.0)
        };

        Ok(CurrentMetrics {
            cpu,
            memory,
            cpu_trend: cpu - baseline(MetricType::Cpu),
            memory_trend: memory - baseline(MetricType::Memory),
        })
    }

    /// Counters accumulated since the engine was created
    pub fn stats(&self) -> TickStatsSnapshot {
        self.stats.snapshot()
    }

    /// Log the accumulated counters
    pub fn log_stats(&self) {
        self.stats.log_summary();
    }

    async fn read_telemetry(&self) -> Result<TelemetrySnapshot, TelemetryError> {
        match tokio::time::timeout(self.telemetry_timeout, self.provider.sample()).await {
            Ok(result) => result.and_then(TelemetrySnapshot::validate),
            Err(_) => Err(TelemetryError::Timeout(self.telemetry_timeout)),
        }
    }

    /// Evaluate one metric and append an alert if allowed; returns whether one was emitted
    fn evaluate_metric(
        &self,
        state: &mut EngineState,
        metric_type: MetricType,
        value: f64,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        let config = match self.thresholds.get(metric_type)? {
            Some(config) => config,
            None => {
                debug!("No threshold configured for {}, skipping", metric_type);
                return Ok(false);
            }
        };

        let breach = match evaluate(value, &config) {
            Some(breach) => breach,
            None => return Ok(false),
        };

        if !state.cooldown.can_emit_at(metric_type, now) {
            debug!(
                "{} {:?} alert suppressed by cooldown (value {}%)",
                metric_type, breach.severity, value
            );
            return Ok(false);
        }

        let message = alert_message(metric_type, breach.severity, value);
        let alert = Alert::new(
            metric_type,
            breach.severity,
            message.clone(),
            value,
            breach.threshold,
            now,
        );
        self.alerts.append(alert)?;
        state.cooldown.record_at(metric_type, now);

        info!("Alert emitted: {}", message);
        Ok(true)
    }

    fn latest_value(&self, metric_type: MetricType) -> Result<f64, StoreError> {
        Ok(self
            .samples
            .latest(metric_type)?
            .map(|sample| sample.value)
            .unwrap_or(0.0))
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
