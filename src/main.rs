//! metricgen - Synthetic metrics daemon
//!
//! Serves generated counter and gauge series on a Prometheus scrape
//! endpoint and lets an operator switch the active load mode over
//! HTTP while the update loops keep running.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metricgen::error::{ConfigError, DaemonResult};
use metricgen::{Config, Server};

/// metricgen CLI
#[derive(Parser)]
#[command(name = "metricgend")]
#[command(about = "Synthetic metrics daemon with runtime-switchable load modes", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        env = "METRICGEN_CONFIG",
        default_value = "./metricgen.yml"
    )]
    config: String,

    /// Listen address, overriding the configuration file
    #[arg(short, long, env = "METRICGEN_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "METRICGEN_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "METRICGEN_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config = Config::load(&cli.config)?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr(listen.clone()))?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config,
        namespace = %config.namespace,
        metrics = config.metrics.len(),
        modes = config.modes.len(),
        "starting metricgen"
    );

    // Create and run server
    let server = Server::new(config)?;
    server.run().await
}
