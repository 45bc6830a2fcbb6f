//! Error handling for the pi_climate exporter.

/// A specialized `Result` type for pi_climate operations.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Failures talking to the humidity/temperature peripheral.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// I2C transfer failed (bus error, NACK, timeout)
    #[error("I2C bus error: {0}")]
    Bus(String),

    /// The CRC byte returned with a measurement did not match
    #[error("checksum mismatch (expected {expected:#04x}, got {actual:#04x})")]
    Checksum { expected: u8, actual: u8 },

    /// No sensor is reachable in this build or on this machine
    #[error("sensor unavailable: {0}")]
    Unavailable(String),
}

impl SensorError {
    /// Create a new bus error
    pub fn bus_error(msg: impl Into<String>) -> Self {
        Self::Bus(msg.into())
    }

    /// Create a new unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// The main error type for the exporter.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sensor read failed
    #[error("Error reading sensor: {0}")]
    Sensor(#[from] SensorError),

    /// The CPU thermal zone could not be read
    #[error("CPU temperature unavailable")]
    CpuTemperatureUnavailable,

    /// Gauge registration or text encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExporterError {
    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only skips a collection cycle.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Sensor(_) | Self::CpuTemperatureUnavailable | Self::Io(_)
        )
    }
}
