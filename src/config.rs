//! Runtime configuration for the exporter.

use crate::web::WebConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the collection interval in seconds.
pub const INTERVAL_ENV: &str = "RUN_INTERVAL_SECONDS";

/// Configuration loaded once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Time between the start of one collection and the next
    pub run_interval: Duration,
    /// Where the metrics endpoint listens
    pub web: WebConfig,
    /// I2C bus number the sensor hangs off
    pub i2c_bus: u8,
    /// 7-bit I2C address of the sensor
    pub sensor_address: u16,
    /// File holding the CPU temperature in millidegrees Celsius
    pub thermal_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_interval: Duration::from_secs(crate::DEFAULT_INTERVAL_SECS),
            web: WebConfig::default(),
            i2c_bus: crate::DEFAULT_I2C_BUS,
            sensor_address: crate::metrics::sensor::HTU21D_ADDRESS,
            thermal_path: PathBuf::from(crate::metrics::cpu::CPU_TEMP_PATH),
        }
    }
}

impl RunConfig {
    /// Create a configuration with the given interval and defaults elsewhere.
    pub fn new(run_interval: Duration) -> Self {
        Self {
            run_interval,
            ..Default::default()
        }
    }

    /// Set the I2C bus number.
    pub fn with_i2c_bus(mut self, bus: u8) -> Self {
        self.i2c_bus = bus;
        self
    }

    /// Set the CPU thermal zone file.
    pub fn with_thermal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.thermal_path = path.into();
        self
    }
}

/// Parse an interval given in whole seconds.
///
/// Surrounding whitespace is ignored. Zero, negative, fractional and
/// non-numeric values are rejected.
pub fn parse_interval(raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(format!("{} must be a positive integer, got 0", INTERVAL_ENV)),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!(
            "{} environment variable must be an integer, got {:?}",
            INTERVAL_ENV, raw
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_accepts_positive_integers() {
        assert_eq!(parse_interval("60"), Ok(60));
        assert_eq!(parse_interval(" 5\n"), Ok(5));
        assert_eq!(parse_interval("1"), Ok(1));
    }

    #[test]
    fn test_parse_interval_rejects_garbage() {
        assert!(parse_interval("abc").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("1.5").is_err());
        assert!(parse_interval("-3").is_err());
        assert!(parse_interval("0").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.run_interval, Duration::from_secs(60));
        assert_eq!(config.web.port, 8000);
        assert_eq!(config.sensor_address, 0x40);
        assert_eq!(config.i2c_bus, 1);
        assert_eq!(
            config.thermal_path,
            PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
        );
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::new(Duration::from_secs(5))
            .with_i2c_bus(3)
            .with_thermal_path("/tmp/temp");
        assert_eq!(config.run_interval, Duration::from_secs(5));
        assert_eq!(config.i2c_bus, 3);
        assert_eq!(config.thermal_path, PathBuf::from("/tmp/temp"));
        assert_eq!(config.web.port, 8000);
    }
}
