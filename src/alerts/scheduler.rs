use crate::alerts::engine::{AlertingEngine, TickOutcome};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Periodic driver for the alerting engine
///
/// Owns a background task that calls [`AlertingEngine::tick`] on a fixed
/// period. Ticks run one after another inside that task; a tick that overruns
/// the period causes the missed ticks to be skipped rather than bunched up.
pub struct MetricsScheduler {
    engine: Arc<AlertingEngine>,
    period: Duration,
    /// Shared state for controlling the scheduler
    running: Arc<AtomicBool>,
    shutdown_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<JoinHandle<()>>,
}

impl MetricsScheduler {
    /// Create a stopped scheduler
    ///
    /// # Arguments
    ///
    /// * `engine` - Engine ticked on every period
    /// * `period` - Time between two ticks (e.g. `Duration::from_secs(5)`)
    pub fn new(engine: Arc<AlertingEngine>, period: Duration) -> Self {
        Self {
            engine,
            period,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
            task_handle: None,
        }
    }

    /// Start ticking; the first tick runs immediately
    ///
    /// Calling `start` on a running scheduler does nothing. Must be called from
    /// within a tokio runtime.
    pub fn start(&mut self) {
        if self.task_exited() {
            warn!("MetricsScheduler task exited unexpectedly, restarting");
            self.running.store(false, Ordering::SeqCst);
            self.shutdown_tx = None;
            self.task_handle = None;
        }

        if self.running.swap(true, Ordering::SeqCst) {
            info!("MetricsScheduler already running, skipping start");
            return;
        }

        info!("Starting MetricsScheduler with period: {:?}", self.period);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let engine = Arc::clone(&self.engine);
        let period = self.period;

        let handle = tokio::spawn(Self::run(engine, period, shutdown_rx));

        self.shutdown_tx = Some(shutdown_tx);
        self.task_handle = Some(handle);
    }

    /// Stop ticking and wait for the background task to finish
    ///
    /// A tick in progress is allowed to complete. Stopping a stopped scheduler
    /// does nothing.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("MetricsScheduler already stopped");
            return;
        }

        info!("Stopping MetricsScheduler");

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // The receiver is gone only if the task already exited
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                warn!("MetricsScheduler task ended abnormally: {}", e);
            }
        }

        info!("MetricsScheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.task_exited()
    }

    /// True if the background task ended without being stopped, e.g. after a panic
    fn task_exited(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
    }

    async fn run(
        engine: Arc<AlertingEngine>,
        period: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match engine.tick().await {
                        TickOutcome::Completed { alerts_emitted, persistence_failures, .. } => {
                            if persistence_failures > 0 {
                                warn!(
                                    "Tick completed with {} persistence failures",
                                    persistence_failures
                                );
                            }
                            debug!("Tick completed, {} alerts emitted", alerts_emitted);
                        }
                        TickOutcome::Skipped { reason } => {
                            debug!("Tick skipped: {}", reason);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    debug!("MetricsScheduler received shutdown signal");
                    break;
                }
            }
        }
    }
}
