//! ipcheck-alert - logs every scan result published by the submission API
//!
//! Reads partition 0 of `ip_scan_result` from the oldest retained offset until SIGINT or
//! SIGTERM. Failing to reach the broker or the partition at startup is fatal.

use anyhow::{Context, Result};
use clap::Parser;
use ipcheck_broker::{shutdown, ScanResultConsumer};
use ipcheck_core::logging::{self, LogFormat};
use ipcheck_core::Config;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ipcheck-alert")]
#[command(about = "Consume IP scan results from Kafka and log them")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "IPCHECK_CONFIG", default_value = "ipcheck.toml")]
    config: PathBuf,

    /// Log level (debug, info, warn, error); overrides the config file
    #[arg(short = 'L', long)]
    log_level: Option<String>,

    /// Log format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(level) = args.log_level {
        config.log.level = level;
    }

    logging::init(&config.log.level, args.log_format)?;
    config.validate_broker()?;

    info!(broker = %config.kafka.broker, "alert service starting");

    let broker = config.kafka.broker.clone();
    let consumer = match tokio::task::spawn_blocking(move || ScanResultConsumer::connect(&broker))
        .await
        .context("consumer startup task failed")?
    {
        Ok(consumer) => consumer,
        Err(e) => {
            error!(broker = %config.kafka.broker, error = %e, "failed to start Kafka consumer");
            return Err(e.into());
        }
    };

    let stats = consumer.run(shutdown::signal()).await;

    info!(
        topic = %consumer.topic(),
        decoded = stats.decoded,
        rejected = stats.rejected,
        errors = stats.errors,
        "alert service stopped"
    );
    Ok(())
}
