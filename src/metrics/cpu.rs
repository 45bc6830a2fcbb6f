//! CPU temperature from the kernel thermal zone.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Raspberry Pi SoC thermal zone, in millidegrees Celsius.
pub const CPU_TEMP_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Read the CPU temperature in degrees Celsius from the default thermal zone.
pub fn read_cpu_temperature() -> Option<f64> {
    read_cpu_temperature_from(CPU_TEMP_PATH)
}

/// Read a millidegree value from `path` and convert it to degrees Celsius.
///
/// Returns `None` when the file is missing or does not hold a number.
pub fn read_cpu_temperature_from(path: impl AsRef<Path>) -> Option<f64> {
    let path = path.as_ref();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No thermal zone at {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Error while reading CPU temp: {}", e);
            return None;
        }
    };

    match raw.trim().parse::<f64>() {
        Ok(millicelsius) => Some(millicelsius / 1000.0),
        Err(e) => {
            warn!("Error while reading CPU temp: {:?} is not a number ({})", raw.trim(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn thermal_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_millidegrees() {
        let file = thermal_file("45213\n");
        let celsius = read_cpu_temperature_from(file.path()).unwrap();
        assert!((celsius - 45.213).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_cpu_temperature_from(dir.path().join("temp")), None);
    }

    #[test]
    fn test_unparseable_contents() {
        let file = thermal_file("hot\n");
        assert_eq!(read_cpu_temperature_from(file.path()), None);
    }

    #[test]
    fn test_empty_file() {
        let file = thermal_file("");
        assert_eq!(read_cpu_temperature_from(file.path()), None);
    }
}
