//! Naskh - Hierarchical storage mirroring gateway
//!
//! Replays file and directory mutations from a source storage account
//! against a backup account, driven by push notifications.

use clap::Parser;
use naskh_core::MirrorConfig;
use naskh_gateway::GatewayServer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "naskh")]
#[command(version = naskh_core::VERSION)]
#[command(about = "Mirrors hierarchical storage mutations to a backup account", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address
    #[arg(long, env = "NASKH_BIND_ADDRESS")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, env = "NASKH_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "NASKH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    let mut config = match &cli.config {
        Some(path) => MirrorConfig::from_file(path)?,
        None => MirrorConfig::default(),
    };
    config.apply_env();

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!("starting naskh {}", naskh_core::VERSION);

    GatewayServer::new(config).run().await?;
    Ok(())
}
