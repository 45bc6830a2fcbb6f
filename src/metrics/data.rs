//! Data structures for sensor readings.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Raw values as reported by the humidity/temperature peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Ambient temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
}

/// One successful collection cycle, rounded the way it is published.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the reading was taken (Unix timestamp in milliseconds)
    pub timestamp: u64,
    /// Ambient temperature in degrees Celsius, one decimal
    pub temperature: f64,
    /// Relative humidity in percent, whole number
    pub humidity: f64,
    /// CPU temperature in degrees Celsius, one decimal
    pub cpu_temp: f64,
}

impl Reading {
    /// Combine a sensor reading and a CPU temperature, applying publication rounding.
    pub fn from_raw(sensor: SensorReading, cpu_celsius: f64) -> Self {
        Self {
            timestamp: now_millis(),
            temperature: round_to_tenth(sensor.temperature),
            humidity: sensor.humidity.round(),
            cpu_temp: round_to_tenth(cpu_celsius),
        }
    }
}

/// Round to one decimal place, halves away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_matches_published_precision() {
        let reading = Reading::from_raw(
            SensorReading {
                temperature: 22.34,
                humidity: 47.6,
            },
            45.213,
        );
        assert_eq!(reading.temperature, 22.3);
        assert_eq!(reading.humidity, 48.0);
        assert_eq!(reading.cpu_temp, 45.2);
        assert!(reading.timestamp > 0);
    }

    #[test]
    fn test_round_to_tenth_negative() {
        assert_eq!(round_to_tenth(-3.26), -3.3);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[test]
    fn test_reading_serialization() {
        let reading = Reading {
            timestamp: 1_700_000_000_000,
            temperature: 21.5,
            humidity: 40.0,
            cpu_temp: 50.1,
        };
        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"cpu_temp\":50.1"));
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}
