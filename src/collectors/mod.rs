/// Host CPU and memory telemetry
pub mod telemetry;

pub use telemetry::{SystemTelemetry, TelemetryProvider, TelemetrySnapshot};
