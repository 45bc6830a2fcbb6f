//! One read-and-publish pass over the sensor and the CPU thermal zone.

use crate::error::{ExporterError, Result};
use crate::metrics::{
    cpu::read_cpu_temperature_from,
    data::Reading,
    registry::MetricsRegistry,
    sensor::{read_sensor, HumiditySensor},
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Reads the sensor and CPU temperature and publishes them as gauges.
pub struct Collector {
    sensor: Box<dyn HumiditySensor + Send>,
    metrics: MetricsRegistry,
    thermal_path: PathBuf,
}

impl Collector {
    /// Create a collector publishing into `metrics`.
    pub fn new(
        sensor: Box<dyn HumiditySensor + Send>,
        metrics: MetricsRegistry,
        thermal_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sensor,
            metrics,
            thermal_path: thermal_path.into(),
        }
    }

    /// Take a reading without touching the gauges.
    pub fn read(&mut self) -> Result<Reading> {
        let sensor = read_sensor(self.sensor.as_mut()).map_err(|e| {
            warn!("Error reading sensor: {}", e);
            ExporterError::from(e)
        })?;

        let cpu = read_cpu_temperature_from(&self.thermal_path)
            .ok_or(ExporterError::CpuTemperatureUnavailable)?;

        Ok(Reading::from_raw(sensor, cpu))
    }

    /// Run one collection cycle.
    ///
    /// Either all three gauges are updated or none are; on failure the
    /// previously published values stay visible to scrapers.
    pub fn collect(&mut self) -> Result<Reading> {
        let reading = self.read()?;
        self.metrics.publish(&reading);

        info!(
            "Data collected and set. Humidity: {}%. Temperature: {}C. Cpu: {}C",
            reading.humidity, reading.temperature, reading.cpu_temp
        );
        Ok(reading)
    }
}
