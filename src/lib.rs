//! # pi_climate - Raspberry Pi Climate Exporter
//!
//! Periodically reads ambient temperature and relative humidity from an
//! HTU21D sensor on the I2C bus plus the SoC temperature from the kernel
//! thermal zone, and exposes them as Prometheus gauges for scraping.
//!
//! ## Features
//!
//! - **Three gauges**: `humidity`, `temperature` and `cpu_temp`, nothing else
//! - **Stale-but-last-known**: a failed cycle leaves the previous values in place
//! - **Fast shutdown**: SIGINT/SIGTERM are honoured within about a second
//! - **Cross-compilation**: I2C access is behind the `hardware` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pi_climate::{
//!     metrics::sensor::default_sensor, run, start_metrics_server, Collector, MetricsRegistry,
//!     RunConfig, ShutdownFlag,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::default();
//!     let metrics = MetricsRegistry::new()?;
//!     start_metrics_server(&config.web, metrics.clone()).await?;
//!
//!     let sensor = default_sensor(config.i2c_bus, config.sensor_address);
//!     let collector = Collector::new(sensor, metrics, &config.thermal_path);
//!     run(collector, config.run_interval, ShutdownFlag::new()).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod runner;
pub mod shutdown;
pub mod web;

// Re-export public API
pub use config::RunConfig;
pub use error::{ExporterError, Result, SensorError};
pub use metrics::{
    collector::Collector,
    data::{Reading, SensorReading},
    registry::MetricsRegistry,
    sensor::HumiditySensor,
};
pub use runner::{run, RunStats};
pub use shutdown::{listen_for_signals, ShutdownFlag};
pub use web::{start_metrics_server, WebConfig};

/// The default collection interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// The port the metrics endpoint listens on
pub const METRICS_PORT: u16 = 8000;

/// The default I2C bus on a Raspberry Pi header
pub const DEFAULT_I2C_BUS: u8 = 1;
