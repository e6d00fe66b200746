//! # GPS Bridge
//!
//! Reads GPS records from the serial port and forwards them to the
//! dashboard server.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber;

use gps_tracker::bridge::{self, IngestClient};
use gps_tracker::config::Config;
use gps_tracker::serial::GpsSerial;

#[derive(Parser, Debug)]
#[command(
    name = "gps-bridge",
    version,
    about = "Serial to server bridge for GPS telemetry"
)]
struct Args {
    /// Serial port of the GPS device (auto-detected when omitted)
    port: Option<String>,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server base URL
    #[arg(short, long)]
    server_url: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(port) = &args.port {
        config.serial.port = port.clone();
    }
    if let Some(url) = &args.server_url {
        config.bridge.server_url = url.clone();
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

    info!("GPS Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let serial = match GpsSerial::open(&config.serial) {
        Ok(serial) => serial,
        Err(e) => {
            error!("{}", e);
            error!("GPS device not found. Specify the port manually: gps-bridge /dev/ttyACM0");
            return Err(e.into());
        }
    };
    let client = IngestClient::new(&config.bridge);

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = bridge::run(serial, client) => result?,

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
