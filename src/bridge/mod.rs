//! # Bridge Module
//!
//! Forwards readings from the serial port to the dashboard server.
//!
//! This module handles:
//! - Best-effort HTTP delivery of parsed readings
//! - The sequential read / classify / deliver loop
//!
//! Delivery failures are soft errors: the reading is dropped with a warning
//! and the loop moves on to the next line. There is no retry, backoff, or
//! queueing; the next reading is seconds away anyway.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::frame::{self, ParsedLine};
use crate::serial::GpsSerial;
use crate::telemetry::GpsReading;

/// HTTP client for the server's ingest endpoint
pub struct IngestClient {
    client: reqwest::Client,
    update_url: String,
}

impl IngestClient {
    /// Build a client aimed at the configured server
    ///
    /// The request timeout doubles as the connect timeout; a delivery is
    /// abandoned entirely once it exceeds the budget.
    pub fn new(config: &BridgeConfig) -> Self {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        let update_url = format!(
            "{}/api/gps/update",
            config.server_url.trim_end_matches('/')
        );

        Self { client, update_url }
    }

    /// Deliver one reading to the server
    ///
    /// # Errors
    ///
    /// Returns error on connect failure, timeout, or a non-2xx response
    pub async fn deliver(&self, reading: &GpsReading) -> Result<()> {
        let response = self
            .client
            .get(&self.update_url)
            .query(&[
                ("lat", reading.latitude.to_string()),
                ("lon", reading.longitude.to_string()),
                ("speed", reading.speed.to_string()),
                ("altitude", reading.altitude.to_string()),
                ("satellites", reading.satellites.to_string()),
            ])
            .send()
            .await?;

        response.error_for_status()?;
        Ok(())
    }

    /// The full ingest URL this client delivers to
    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

/// Run the bridge loop until the port closes
///
/// Reads one line at a time, classifies it, and delivers telemetry records
/// to the server. Unrecognized device output is echoed to the log;
/// malformed records are dropped silently.
///
/// # Errors
///
/// Returns error when the serial port fails mid-read (device unplugged)
pub async fn run(mut serial: GpsSerial, client: IngestClient) -> Result<()> {
    info!("Connected to {}", serial.device_path());
    info!("Sending data to {}", client.update_url());
    info!("Waiting for GPS data...");

    loop {
        match serial.read_line().await? {
            Some(line) => handle_line(&line, &client).await,
            None => {
                warn!("Serial port reached end of stream; stopping bridge");
                return Ok(());
            }
        }
    }
}

/// Classify one line and act on it
async fn handle_line(line: &str, client: &IngestClient) {
    match frame::parse_line(line) {
        Some(ParsedLine::Reading(reading)) => match client.deliver(&reading).await {
            Ok(()) => {
                info!(
                    "Speed: {:.1} MPH | Sat: {} | ({:.5}, {:.5})",
                    reading.speed, reading.satellites, reading.latitude, reading.longitude
                );
            }
            Err(e) => {
                warn!("Failed to deliver reading: {} (is the server running?)", e);
            }
        },
        Some(ParsedLine::Malformed) => {
            debug!("Discarding malformed record: {}", line);
        }
        Some(ParsedLine::Unrecognized) => {
            info!("[serial] {}", line);
        }
        None => {}
    }
}
