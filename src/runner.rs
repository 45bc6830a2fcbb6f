//! The collection loop.

use crate::metrics::Collector;
use crate::shutdown::ShutdownFlag;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info};

/// Granularity at which a sleeping loop notices a shutdown request.
pub const SLEEP_CHUNK: Duration = Duration::from_secs(1);

/// Counters describing what a finished loop did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Collection cycles started
    pub cycles: u64,
    /// Cycles that updated the gauges
    pub published: u64,
    /// Cycles that failed and left the gauges untouched
    pub skipped: u64,
}

/// Collect every `interval` until `shutdown` is requested.
///
/// Collection errors, including panics inside a cycle, are logged and count
/// as skipped cycles. Nothing but the shutdown flag ends the loop.
pub async fn run(collector: Collector, interval: Duration, shutdown: ShutdownFlag) -> RunStats {
    let collector = Arc::new(Mutex::new(collector));
    let mut stats = RunStats::default();

    while !shutdown.is_stopping() {
        run_cycle(&collector, &mut stats).await;

        if !sleep_interval(interval, &shutdown).await {
            break;
        }
    }

    info!("Application shutting down.");
    stats
}

async fn run_cycle(collector: &Arc<Mutex<Collector>>, stats: &mut RunStats) {
    stats.cycles += 1;

    // Sensor I/O sleeps between trigger and read, keep it off the async workers.
    let cycle = Arc::clone(collector);
    let outcome = tokio::task::spawn_blocking(move || {
        let mut collector = cycle.lock().unwrap_or_else(PoisonError::into_inner);
        collector.collect()
    })
    .await;

    match outcome {
        Ok(Ok(_)) => stats.published += 1,
        Ok(Err(e)) if e.is_recoverable() => {
            stats.skipped += 1;
            debug!("Cycle skipped: {}", e);
        }
        Ok(Err(e)) => {
            stats.skipped += 1;
            error!("Error while collecting, will try again next time. Error: {}", e);
        }
        Err(e) => {
            stats.skipped += 1;
            error!(
                "Error while collecting, will try again next time. Error: {}",
                e
            );
        }
    }
}

/// Sleep for `interval` in [`SLEEP_CHUNK`] steps, then the sub-chunk remainder.
///
/// The flag is checked before every step. Returns `false` as soon as
/// shutdown is observed, `true` if the full interval elapsed.
pub async fn sleep_interval(interval: Duration, shutdown: &ShutdownFlag) -> bool {
    let chunks = interval.as_nanos() / SLEEP_CHUNK.as_nanos();
    let remainder =
        Duration::from_nanos((interval.as_nanos() % SLEEP_CHUNK.as_nanos()) as u64);

    for _ in 0..chunks {
        if shutdown.is_stopping() {
            return false;
        }
        time::sleep(SLEEP_CHUNK).await;
    }

    if shutdown.is_stopping() {
        return false;
    }
    if !remainder.is_zero() {
        time::sleep(remainder).await;
    }

    !shutdown.is_stopping()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::metrics::{HumiditySensor, MetricsRegistry, SensorReading};
    use std::io::Write;
    use tokio::time::Instant;

    struct FlakySensor {
        calls: u32,
    }

    impl HumiditySensor for FlakySensor {
        fn read(&mut self) -> Result<SensorReading, SensorError> {
            self.calls += 1;
            match self.calls {
                1 => panic!("bus driver exploded"),
                2 => Err(SensorError::bus_error("nack")),
                _ => Ok(SensorReading {
                    temperature: 22.34,
                    humidity: 47.6,
                }),
            }
        }
    }

    fn stop_after(flag: &ShutdownFlag, after: Duration) {
        let flag = flag.clone();
        tokio::spawn(async move {
            time::sleep(after).await;
            flag.request_stop();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_shutdown() {
        let flag = ShutdownFlag::new();
        let start = Instant::now();
        assert!(sleep_interval(Duration::from_millis(2500), &flag).await);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2500));
        assert!(elapsed < Duration::from_millis(2600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_sleep_is_observed_within_a_chunk() {
        let flag = ShutdownFlag::new();
        stop_after(&flag, Duration::from_millis(2500));

        let start = Instant::now();
        assert!(!sleep_interval(Duration::from_secs(3600), &flag).await);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2500));
        assert!(elapsed <= Duration::from_millis(2500) + SLEEP_CHUNK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_stopping_returns_immediately() {
        let flag = ShutdownFlag::new();
        flag.request_stop();
        let start = Instant::now();
        assert!(!sleep_interval(Duration::from_secs(60), &flag).await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_failing_cycles() {
        let mut thermal = tempfile::NamedTempFile::new().unwrap();
        thermal.write_all(b"45213").unwrap();

        let metrics = MetricsRegistry::new().unwrap();
        let collector = Collector::new(
            Box::new(FlakySensor { calls: 0 }),
            metrics.clone(),
            thermal.path(),
        );

        let flag = ShutdownFlag::new();
        stop_after(&flag, Duration::from_secs(12));

        let stats = run(collector, Duration::from_secs(5), flag).await;
        assert!(stats.cycles >= 3, "{:?}", stats);
        assert_eq!(stats.cycles, stats.published + stats.skipped);
        assert_eq!(stats.skipped, 2);
        assert_eq!(metrics.values(), (48.0, 22.3, 45.2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_before_start_runs_no_cycle() {
        let metrics = MetricsRegistry::new().unwrap();
        let collector = Collector::new(
            Box::new(FlakySensor { calls: 0 }),
            metrics,
            "/nonexistent/thermal",
        );
        let flag = ShutdownFlag::new();
        flag.request_stop();

        let stats = run(collector, Duration::from_secs(5), flag).await;
        assert_eq!(stats, RunStats::default());
    }
}
