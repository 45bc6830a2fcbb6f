//! Sensor reading and metrics publication.
//!
//! This module reads the HTU21D over I2C and the CPU thermal zone, rounds the
//! values and publishes them as Prometheus gauges.

pub mod collector;
pub mod cpu;
pub mod data;
pub mod registry;
pub mod sensor;

// Re-export commonly used items
pub use collector::Collector;
pub use data::{Reading, SensorReading};
pub use registry::MetricsRegistry;
pub use sensor::HumiditySensor;
