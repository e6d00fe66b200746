//! # Serial Communication Module
//!
//! Handles serial communication with the GPS device over USB.
//!
//! This module handles:
//! - Opening the serial port at 115,200 baud
//! - Auto-detecting the device when no port is configured
//! - Async buffered line reads with lossy UTF-8 decoding

use crate::config::SerialConfig;
use crate::error::{GpsTrackerError, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Default GPS device baud rate (115,200 baud)
pub const GPS_BAUD_RATE: u32 = 115_200;

/// Default device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // USB CDC devices (the Wio Terminal shows up here)
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// GPS Serial Port Handler
///
/// Manages the connection to the GPS device via USB serial and hands out
/// one trimmed line at a time.
pub struct GpsSerial {
    /// Buffered serial port handle
    reader: BufReader<tokio_serial::SerialStream>,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
    /// Reused line buffer
    line_buf: Vec<u8>,
}

impl std::fmt::Debug for GpsSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpsSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl GpsSerial {
    /// Open the connection to the GPS device
    ///
    /// Uses the configured port if one is set; otherwise auto-detects by
    /// enumerating serial ports and finally falling back to common device
    /// paths.
    ///
    /// # Returns
    ///
    /// * `Result<GpsSerial>` - Connected serial port or error
    ///
    /// # Errors
    ///
    /// Returns error if no GPS device was found or the connection fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gps_tracker::config::SerialConfig;
    /// use gps_tracker::serial::GpsSerial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let serial = GpsSerial::open(&SerialConfig::default())?;
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if !config.port.is_empty() {
            return Self::open_path(&config.port, config.baud_rate);
        }

        if let Some(path) = Self::discover_port() {
            info!("Auto-detected GPS device at {}", path);
            return Self::open_path(&path, config.baud_rate);
        }

        Self::open_with_paths(DEFAULT_DEVICE_PATHS, config.baud_rate)
    }

    /// Open a specific device path
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyACM0")
    /// * `baud_rate` - Line speed in baud
    ///
    /// # Returns
    ///
    /// * `Result<GpsSerial>` - Connected serial port or error
    pub fn open_path(path: &str, baud_rate: u32) -> Result<Self> {
        let port = Self::open_port(path, baud_rate)?;
        info!("Successfully opened GPS device at {}", path);

        Ok(Self {
            reader: BufReader::new(port),
            device_path: path.to_string(),
            line_buf: Vec::with_capacity(128),
        })
    }

    /// Open the first device path that works
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyACM0"])
    /// * `baud_rate` - Line speed in baud
    ///
    /// # Returns
    ///
    /// * `Result<GpsSerial>` - Connected serial port or error
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_path(path, baud_rate) {
                Ok(serial) => return Ok(serial),
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(GpsTrackerError::SerialPortNotFound(
            paths.join(", ")
        ))
    }

    /// Enumerate serial ports and pick the one that looks like the GPS device
    ///
    /// The Wio Terminal usually shows up as "usbmodem" on macOS or a
    /// USB-named port elsewhere. When nothing matches, the available ports
    /// are logged so the user can pass one explicitly.
    fn discover_port() -> Option<String> {
        let ports = tokio_serial::available_ports().unwrap_or_default();

        for port in &ports {
            let name = port.port_name.to_lowercase();
            let product = match &port.port_type {
                tokio_serial::SerialPortType::UsbPort(usb) => {
                    usb.product.clone().unwrap_or_default().to_lowercase()
                }
                _ => String::new(),
            };

            if name.contains("usbmodem") || name.contains("usb") || product.contains("wio") {
                return Some(port.port_name.clone());
            }
        }

        if ports.is_empty() {
            debug!("No serial ports enumerated");
        } else {
            info!("Available ports:");
            for port in &ports {
                info!("  {}", port.port_name);
            }
        }

        None
    }

    /// Open a specific serial port with GPS settings (8N1, no flow control)
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| GpsTrackerError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Read the next line from the device
    ///
    /// Blocks until a newline arrives. Invalid UTF-8 is decoded lossily
    /// since the device can emit garbage around resets, and the result is
    /// trimmed of surrounding whitespace and line endings.
    ///
    /// # Returns
    ///
    /// * `Result<Option<String>>` - The line, or `None` once the port hits
    ///   end of stream (device unplugged)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gps_tracker::config::SerialConfig;
    /// use gps_tracker::serial::GpsSerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let mut serial = GpsSerial::open(&SerialConfig::default())?;
    ///
    ///     while let Some(line) = serial.read_line().await? {
    ///         println!("{}", line);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();

        let read = self.reader.read_until(b'\n', &mut self.line_buf).await
            .map_err(|e| GpsTrackerError::Serial(format!("Failed to read from serial port: {}", e)))?;

        if read == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&self.line_buf).trim().to_string()))
    }

    /// Get the device path of the opened serial port
    ///
    /// Returns the path to the serial device that was successfully opened
    /// (e.g., "/dev/ttyACM0" or "/dev/ttyUSB0").
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}
