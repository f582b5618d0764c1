use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use hostwatch::alerts::{AlertingEngine, MetricsScheduler};
use hostwatch::analysis::LogAnalyzer;
use hostwatch::collectors::SystemTelemetry;
use hostwatch::config::Config;
use hostwatch::error::ConfigError;
use hostwatch::events::{CurrentMetrics, Sample, ThresholdConfig};
use hostwatch::monitoring::TickStatsSnapshot;
use hostwatch::report::SummaryReport;
use hostwatch::store::{
    MemoryAlertStore, MemorySampleStore, MemoryThresholdRegistry, SampleStore, ThresholdRegistry,
};
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line arguments for hostwatch
#[derive(Parser)]
#[command(
    name = "hostwatch",
    about = "Host metrics threshold alerting and log analysis",
    long_about = "Samples CPU and memory utilization on a fixed period, raises threshold alerts \
                  with a per-metric cooldown, and classifies log files by severity."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        global = true,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Sample the local host until Ctrl+C, then print a report
    Monitor,
    /// Analyze a log file and print the result
    Analyze {
        /// Log file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if let Some(extension) = config_path.extension() {
                    if extension != "toml" {
                        warn!(
                            "Configuration file does not have .toml extension: {}",
                            config_path.display()
                        );
                    }
                }
            }
        }

        if let Command::Analyze { ref file } = self.command {
            if !file.is_file() {
                return Err(format!("Log file not found: {}", file.display()));
            }
        }

        Ok(())
    }

    /// Convert config path to string safely, handling non-UTF-8 paths
    fn config_path_str(&self) -> Result<Option<&str>, String> {
        match &self.config {
            Some(path) => match path.to_str() {
                Some(path_str) => Ok(Some(path_str)),
                None => Err(format!(
                    "Configuration file path contains invalid UTF-8 characters: {}",
                    path.display()
                )),
            },
            None => Ok(None),
        }
    }
}

/// Load configuration, falling back to defaults when the file is missing or invalid
fn load_config(config_path: Option<&str>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            match Config::from_file(Path::new(path)) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path, e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

/// Everything the monitor prints on shutdown
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonitorReport {
    current: CurrentMetrics,
    thresholds: Vec<ThresholdConfig>,
    /// Newest first, up to the configured history limit
    history: Vec<Sample>,
    summary: SummaryReport,
    stats: TickStatsSnapshot,
}

/// Wires the stores, telemetry and engine together for the `monitor` command
struct HostWatch {
    config: Config,
    samples: Arc<MemorySampleStore>,
    thresholds: Arc<MemoryThresholdRegistry>,
    alerts: Arc<MemoryAlertStore>,
    engine: Arc<AlertingEngine>,
    scheduler: MetricsScheduler,
}

impl HostWatch {
    fn new(config: Config) -> Self {
        info!("Initializing hostwatch with configuration");

        let samples = Arc::new(MemorySampleStore::new(config.retention.max_samples));
        let thresholds = Arc::new(MemoryThresholdRegistry::from_config(&config.thresholds));
        let alerts = Arc::new(MemoryAlertStore::new());

        let engine = Arc::new(
            AlertingEngine::new(
                Arc::new(SystemTelemetry::new()),
                samples.clone(),
                thresholds.clone(),
                alerts.clone(),
            )
            .with_settings(config.monitor.cooldown(), config.monitor.telemetry_timeout()),
        );
        let scheduler = MetricsScheduler::new(Arc::clone(&engine), config.monitor.interval());

        Self {
            config,
            samples,
            thresholds,
            alerts,
            engine,
            scheduler,
        }
    }

    fn start(&mut self) {
        self.scheduler.start();
    }

    async fn stop(&mut self) {
        self.scheduler.stop().await;
        self.engine.log_stats();
    }

    fn report(&self) -> anyhow::Result<MonitorReport> {
        Ok(MonitorReport {
            current: self.engine.current_metrics()?,
            thresholds: self.thresholds.list()?,
            history: self.samples.recent(self.config.retention.history_limit)?,
            summary: SummaryReport::build(self.alerts.as_ref(), self.samples.as_ref(), Utc::now())?,
            stats: self.engine.stats(),
        })
    }
}

async fn run_monitor(config: Config) -> anyhow::Result<()> {
    let mut hostwatch = HostWatch::new(config);

    for threshold in hostwatch.thresholds.list()? {
        info!(
            "{} thresholds: warning={}%, critical={}%",
            threshold.metric_type, threshold.warning, threshold.critical
        );
    }

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down gracefully...");
        if let Err(e) = shutdown_tx.send(()) {
            error!("Failed to send shutdown signal: {}", e);
        }
    })
    .context("Error setting SIGINT handler for graceful shutdown")?;

    hostwatch.start();
    info!("hostwatch is running. Press Ctrl+C to stop.");

    shutdown_rx.recv().await;
    hostwatch.stop().await;

    let report = hostwatch.report()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!("hostwatch shutdown complete");
    Ok(())
}

fn run_analyze(config: &Config, file: &Path) -> anyhow::Result<()> {
    let result = LogAnalyzer::analyze_file(file, config.analysis.max_file_bytes)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config_path = match cli.config_path_str() {
        Ok(path) => path,
        Err(e) => {
            error!("Invalid configuration path: {}", e);
            std::process::exit(1);
        }
    };
    let config = load_config(config_path);

    match &cli.command {
        Command::Monitor => run_monitor(config).await,
        Command::Analyze { file } => run_analyze(&config, file),
    }
}
