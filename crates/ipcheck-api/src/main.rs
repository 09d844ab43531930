//! ipcheck-api - IP submission service

use anyhow::{Context, Result};
use clap::Parser;
use ipcheck_broker::{shutdown, KafkaPublisher};
use ipcheck_client::VirusTotalClient;
use ipcheck_core::logging::{self, LogFormat};
use ipcheck_core::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ipcheck-api")]
#[command(about = "Check submitted IPs against VirusTotal and publish the verdicts to Kafka")]
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
    config.validate_api()?;

    let checker = VirusTotalClient::builder(config.virustotal.api_key.as_str())
        .base_url(config.virustotal.base_url.as_str())
        .timeout(Duration::from_secs(config.virustotal.timeout_secs))
        .build()?;

    let publisher = Arc::new(KafkaPublisher::with_message_timeout(
        &config.kafka.broker,
        Duration::from_secs(config.kafka.message_timeout_secs),
    )?);
    info!(broker = %config.kafka.broker, topic = %publisher.topic(), "publisher ready");

    let state = ipcheck_api::AppState::new(Arc::new(checker), publisher.clone());
    let app = ipcheck_api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(port = config.server.port, "API started");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await;

    if let Err(e) = publisher.close() {
        error!(error = %e, "failed to flush publisher");
    }

    served.context("server error")?;
    info!("API stopped");
    Ok(())
}
