//! # Error Types
//!
//! Custom error types for GPS Tracker using `thiserror`.

use thiserror::Error;

/// Main error type for GPS Tracker
#[derive(Debug, Error)]
pub enum GpsTrackerError {
    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// No usable serial port was found
    #[error("Serial port not found: {0}")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP delivery errors
    #[error("Delivery error: {0}")]
    Delivery(#[from] reqwest::Error),
}

/// Result type alias for GPS Tracker
pub type Result<T> = std::result::Result<T, GpsTrackerError>;
