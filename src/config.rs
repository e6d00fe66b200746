//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Both binaries read the same file: `gps-server` uses the `[server]`
//! section, `gps-bridge` uses `[serial]` and `[bridge]`. Every field has a
//! default, so a missing file or a partial file is fine.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    #[serde(default = "default_dashboard")]
    pub dashboard: String,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Device path; empty means auto-detect
    #[serde(default)]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Bridge delivery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// Default value functions
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_server_port() -> u16 { 5002 }
fn default_dashboard() -> String { "full".to_string() }

fn default_baud_rate() -> u32 { crate::serial::GPS_BAUD_RATE }

fn default_server_url() -> String { "http://localhost:5002".to_string() }
fn default_request_timeout_ms() -> u64 { 2000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_server_port(),
            dashboard: default_dashboard(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            serial: SerialConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gps_tracker::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate server configuration
        if self.server.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("bind_address must be a valid IP address")
            ));
        }

        if self.server.port == 0 {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("server port must be greater than 0")
            ));
        }

        if !["full", "minimal"].contains(&self.server.dashboard.as_str()) {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("dashboard must be one of: full, minimal")
            ));
        }

        // Serial port may be empty (auto-detect), so no check there.

        // Validate baud rate
        if ![4800, 9600, 19200, 38400, 57600, 115200, 230400].contains(&self.serial.baud_rate) {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("baud_rate must be one of: 4800, 9600, 19200, 38400, 57600, 115200, 230400")
            ));
        }

        // Validate bridge configuration
        if !self.bridge.server_url.starts_with("http://")
            && !self.bridge.server_url.starts_with("https://") {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("server_url must start with http:// or https://")
            ));
        }

        if self.bridge.request_timeout_ms == 0 || self.bridge.request_timeout_ms > 60000 {
            return Err(crate::error::GpsTrackerError::Config(
                toml::de::Error::custom("request_timeout_ms must be between 1 and 60000")
            ));
        }

        Ok(())
    }
}
