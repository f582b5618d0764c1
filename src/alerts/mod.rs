/// Per metric-type alert cooldown
pub mod cooldown;
/// Tick pipeline: telemetry, samples, threshold evaluation, alerts
pub mod engine;
/// Periodic driver for the engine
pub mod scheduler;
pub mod threshold;

pub use cooldown::CooldownTracker;
pub use engine::{AlertingEngine, TickOutcome};
pub use scheduler::MetricsScheduler;
pub use threshold::{evaluate, Breach};
