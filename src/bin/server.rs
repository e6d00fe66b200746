//! # GPS Server
//!
//! Hosts the live dashboard and the telemetry ingest API.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber;

use gps_tracker::config::Config;
use gps_tracker::server;

#[derive(Parser, Debug)]
#[command(
    name = "gps-server",
    version,
    about = "GPS tracking dashboard and telemetry API"
)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured HTTP port
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Overrides can reintroduce invalid values
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("GPS Tracking Server v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Dashboard: http://localhost:{}", config.server.port);
    info!("API endpoint: http://localhost:{}/api/gps/update", config.server.port);
    info!("Press Ctrl+C to exit");

    let state = server::shared_state();

    tokio::select! {
        result = server::run(&config.server, state) => result?,

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
