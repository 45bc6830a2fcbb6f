//! Prometheus gauges for the published readings.

use crate::error::Result;
use crate::metrics::data::Reading;
use prometheus::{Encoder, Gauge, Registry, TextEncoder};

/// Owns a private registry holding exactly the three exported gauges.
///
/// A fresh [`Registry`] carries no process or runtime collectors, so a scrape
/// only ever returns `humidity`, `temperature` and `cpu_temp`. Clones share
/// the same underlying gauges.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    humidity: Gauge,
    temperature: Gauge,
    cpu_temp: Gauge,
}

impl MetricsRegistry {
    /// Create the registry and register the gauges.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let humidity = Gauge::new("humidity", "Humidity percentage measured by the sensor")?;
        let temperature = Gauge::new(
            "temperature",
            "Temperature measured by the sensor in celsius",
        )?;
        let cpu_temp = Gauge::new("cpu_temp", "RPI CPU Temp")?;

        registry.register(Box::new(humidity.clone()))?;
        registry.register(Box::new(temperature.clone()))?;
        registry.register(Box::new(cpu_temp.clone()))?;

        Ok(Self {
            registry,
            humidity,
            temperature,
            cpu_temp,
        })
    }

    /// Overwrite all three gauges with a reading.
    pub fn publish(&self, reading: &Reading) {
        self.humidity.set(reading.humidity);
        self.temperature.set(reading.temperature);
        self.cpu_temp.set(reading.cpu_temp);
    }

    /// Current gauge values as `(humidity, temperature, cpu_temp)`.
    pub fn values(&self) -> (f64, f64, f64) {
        (
            self.humidity.get(),
            self.temperature.get(),
            self.cpu_temp.get(),
        )
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("exposition is not valid UTF-8: {}", e)).into()
        })
    }

    /// Content type of [`encode`](Self::encode)'s output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
