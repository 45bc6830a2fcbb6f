//! pi_climate - Raspberry Pi Climate Exporter Binary
//!
//! Reads the HTU21D and CPU temperature on an interval and serves them on
//! port 8000 for Prometheus.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pi_climate::{
    config::parse_interval,
    listen_for_signals,
    metrics::{cpu::CPU_TEMP_PATH, sensor::default_sensor},
    run, start_metrics_server, Collector, MetricsRegistry, Reading, RunConfig, ShutdownFlag,
    DEFAULT_I2C_BUS, DEFAULT_INTERVAL_SECS,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pi_climate")]
#[command(about = "🌡️  pi_climate - HTU21D and CPU temperature exporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Austin Couch")]
#[command(long_about = "Publishes ambient temperature, humidity and CPU temperature as Prometheus gauges on port 8000")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seconds between collections
    #[arg(
        short,
        long,
        global = true,
        env = "RUN_INTERVAL_SECONDS",
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = parse_interval
    )]
    interval: u64,

    /// I2C bus the sensor is attached to
    #[arg(long, global = true, env = "I2C_BUS", default_value_t = DEFAULT_I2C_BUS)]
    i2c_bus: u8,

    /// File holding the CPU temperature in millidegrees Celsius
    #[arg(long, global = true, env = "CPU_TEMP_PATH", default_value = CPU_TEMP_PATH)]
    thermal_path: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect on an interval and serve metrics (default)
    Serve,

    /// Take a single reading, print it and exit
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig::new(Duration::from_secs(self.interval))
            .with_i2c_bus(self.i2c_bus)
            .with_thermal_path(&self.thermal_path)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration problems are fatal before anything touches hardware or the network.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args).await,
        Some(Commands::Serve) | None => serve_command(&cli).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn print_banner() {
    println!("🌡️  pi_climate - Raspberry Pi Climate Exporter");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
}

async fn serve_command(cli: &Cli) -> anyhow::Result<()> {
    print_banner();

    let config = cli.run_config();
    info!(
        "Application starting. Tasks will run every {} seconds.",
        config.run_interval.as_secs()
    );
    info!("Press Ctrl+C to exit.");

    let shutdown = ShutdownFlag::new();
    listen_for_signals(shutdown.clone()).context("Failed to install signal handlers")?;

    let sensor = default_sensor(config.i2c_bus, config.sensor_address);

    let metrics = MetricsRegistry::new().context("Failed to register gauges")?;
    start_metrics_server(&config.web, metrics.clone())
        .await
        .context("Failed to start metrics server")?;

    let collector = Collector::new(sensor, metrics, &config.thermal_path);
    let stats = run(collector, config.run_interval, shutdown).await;
    info!(
        "Ran {} collection cycles ({} published, {} skipped)",
        stats.cycles, stats.published, stats.skipped
    );

    Ok(())
}

async fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let config = cli.run_config();
    let sensor = default_sensor(config.i2c_bus, config.sensor_address);
    let mut collector = Collector::new(sensor, MetricsRegistry::new()?, &config.thermal_path);

    let reading = tokio::task::spawn_blocking(move || collector.read())
        .await?
        .context("Failed to take a reading")?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&reading)?),
        Format::Pretty => print_pretty_reading(&reading),
    }

    Ok(())
}

fn print_pretty_reading(reading: &Reading) {
    println!(
        "🌡️  Climate Snapshot ({})",
        chrono::DateTime::from_timestamp_millis(reading.timestamp as i64)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");
    println!("  Temperature: {:.1}°C", reading.temperature);
    println!("  Humidity: {:.0}%", reading.humidity);
    println!("  CPU: {:.1}°C", reading.cpu_temp);
}
