//! HTU21D temperature and humidity sensor over I2C.
//!
//! The driver itself is hardware-independent and talks to an [`I2cBus`].
//! The Raspberry Pi bus implementation is feature-gated so the crate still
//! builds and runs on machines without `/dev/i2c-*`.

use crate::error::SensorError;
use crate::metrics::data::SensorReading;
use std::thread;
use std::time::Duration;

/// Fixed 7-bit I2C address of the HTU21D.
pub const HTU21D_ADDRESS: u16 = 0x40;

const CMD_TRIGGER_TEMPERATURE: u8 = 0xF3;
const CMD_TRIGGER_HUMIDITY: u8 = 0xF5;
const CMD_SOFT_RESET: u8 = 0xFE;

// Worst-case conversion times at full resolution, per datasheet.
const TEMPERATURE_DELAY: Duration = Duration::from_millis(50);
const HUMIDITY_DELAY: Duration = Duration::from_millis(16);
const RESET_DELAY: Duration = Duration::from_millis(15);

/// Minimal byte-level access to a device on a two-wire bus.
pub trait I2cBus {
    /// Write `bytes` to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SensorError>;

    /// Fill `buffer` from the device.
    fn read(&mut self, buffer: &mut [u8]) -> Result<(), SensorError>;
}

/// Anything that can produce a temperature/humidity pair.
pub trait HumiditySensor {
    /// Take one temperature and humidity measurement.
    fn read(&mut self) -> Result<SensorReading, SensorError>;
}

/// Query the peripheral once. No retries; the caller decides cadence.
pub fn read_sensor(sensor: &mut dyn HumiditySensor) -> Result<SensorReading, SensorError> {
    sensor.read()
}

/// HTU21D driver using "no hold master" measurements.
pub struct Htu21d<B> {
    bus: B,
    temperature_delay: Duration,
    humidity_delay: Duration,
}

impl<B: I2cBus> Htu21d<B> {
    /// Soft-reset the sensor and wrap the bus.
    pub fn new(bus: B) -> Result<Self, SensorError> {
        Self::with_delays(bus, TEMPERATURE_DELAY, HUMIDITY_DELAY, RESET_DELAY)
    }

    fn with_delays(
        mut bus: B,
        temperature_delay: Duration,
        humidity_delay: Duration,
        reset_delay: Duration,
    ) -> Result<Self, SensorError> {
        bus.write(&[CMD_SOFT_RESET])?;
        thread::sleep(reset_delay);
        Ok(Self {
            bus,
            temperature_delay,
            humidity_delay,
        })
    }

    /// Trigger a measurement and return the raw 16-bit value with status bits cleared.
    fn measure(&mut self, command: u8, delay: Duration) -> Result<u16, SensorError> {
        self.bus.write(&[command])?;
        thread::sleep(delay);

        let mut frame = [0u8; 3];
        self.bus.read(&mut frame)?;

        let expected = crc8(&frame[..2]);
        if expected != frame[2] {
            return Err(SensorError::Checksum {
                expected,
                actual: frame[2],
            });
        }

        Ok(u16::from_be_bytes([frame[0], frame[1]]) & 0xFFFC)
    }

    /// Ambient temperature in degrees Celsius.
    pub fn temperature(&mut self) -> Result<f64, SensorError> {
        let raw = self.measure(CMD_TRIGGER_TEMPERATURE, self.temperature_delay)?;
        Ok(-46.85 + 175.72 * f64::from(raw) / 65536.0)
    }

    /// Relative humidity in percent. Not clamped to 0..=100.
    pub fn relative_humidity(&mut self) -> Result<f64, SensorError> {
        let raw = self.measure(CMD_TRIGGER_HUMIDITY, self.humidity_delay)?;
        Ok(-6.0 + 125.0 * f64::from(raw) / 65536.0)
    }

    /// Release the underlying bus.
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: I2cBus> HumiditySensor for Htu21d<B> {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        let temperature = self.temperature()?;
        let humidity = self.relative_humidity()?;
        Ok(SensorReading {
            temperature,
            humidity,
        })
    }
}

/// CRC-8 with polynomial x^8 + x^5 + x^4 + 1 and zero init.
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |mut crc, &byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
        crc
    })
}

/// Placeholder used when no sensor can be opened. Every read fails.
pub struct UnavailableSensor {
    reason: String,
}

impl UnavailableSensor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl HumiditySensor for UnavailableSensor {
    fn read(&mut self) -> Result<SensorReading, SensorError> {
        Err(SensorError::unavailable(self.reason.clone()))
    }
}

#[cfg(feature = "hardware")]
mod raspberry_pi {
    use super::*;
    use rppal::i2c::I2c;

    /// Linux I2C character device via rppal.
    pub struct RppalBus {
        i2c: I2c,
    }

    impl RppalBus {
        /// Open `/dev/i2c-{bus}` and address the device at `address`.
        pub fn open(bus: u8, address: u16) -> Result<Self, SensorError> {
            let mut i2c = I2c::with_bus(bus).map_err(|e| {
                SensorError::bus_error(format!("Failed to open I2C bus {}: {}", bus, e))
            })?;
            i2c.set_slave_address(address).map_err(|e| {
                SensorError::bus_error(format!("Failed to address {:#04x}: {}", address, e))
            })?;
            Ok(Self { i2c })
        }
    }

    impl I2cBus for RppalBus {
        fn write(&mut self, bytes: &[u8]) -> Result<(), SensorError> {
            let written = self
                .i2c
                .write(bytes)
                .map_err(|e| SensorError::bus_error(e.to_string()))?;
            if written != bytes.len() {
                return Err(SensorError::bus_error(format!(
                    "short write: {} of {} bytes",
                    written,
                    bytes.len()
                )));
            }
            Ok(())
        }

        fn read(&mut self, buffer: &mut [u8]) -> Result<(), SensorError> {
            let read = self
                .i2c
                .read(buffer)
                .map_err(|e| SensorError::bus_error(e.to_string()))?;
            if read != buffer.len() {
                return Err(SensorError::bus_error(format!(
                    "short read: {} of {} bytes",
                    read,
                    buffer.len()
                )));
            }
            Ok(())
        }
    }

    pub fn open_sensor(bus: u8, address: u16) -> Result<Htu21d<RppalBus>, SensorError> {
        Htu21d::new(RppalBus::open(bus, address)?)
    }
}

#[cfg(feature = "hardware")]
pub use raspberry_pi::RppalBus;

/// Open the sensor this build supports.
///
/// If the sensor cannot be opened the exporter keeps running with an
/// [`UnavailableSensor`] so the endpoint stays up and cycles are skipped.
pub fn default_sensor(bus: u8, address: u16) -> Box<dyn HumiditySensor + Send> {
    #[cfg(feature = "hardware")]
    {
        match raspberry_pi::open_sensor(bus, address) {
            Ok(sensor) => {
                tracing::info!("HTU21D initialized on I2C bus {} at {:#04x}", bus, address);
                Box::new(sensor)
            }
            Err(e) => {
                tracing::warn!("Failed to initialize HTU21D, continuing without it: {}", e);
                Box::new(UnavailableSensor::new(e.to_string()))
            }
        }
    }

    #[cfg(not(feature = "hardware"))]
    {
        tracing::warn!(
            "I2C support not compiled (bus {}, address {:#04x}); sensor reads will fail",
            bus,
            address
        );
        Box::new(UnavailableSensor::new(
            "built without the `hardware` feature",
        ))
    }
}
