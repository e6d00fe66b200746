//! Presentation state derived from the aggregated telemetry.
//!
//! Nothing here is stored; status and bands are recomputed from a snapshot
//! every time the dashboard renders.

use chrono::{DateTime, Utc};

/// A feed older than this is considered gone (seconds)
pub const CONNECTED_WINDOW_SECS: i64 = 10;

/// Lower bound of the middle speed band (mph)
pub const BAND_MEDIUM_MPH: f64 = 30.0;

/// Lower bound of the top speed band (mph)
pub const BAND_HIGH_MPH: f64 = 60.0;

/// Freshness of the telemetry feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A reading arrived within the connected window
    Connected,
    /// Readings have arrived before, but not recently
    Disconnected,
    /// No reading has ever arrived
    Waiting,
}

impl ConnectionStatus {
    /// Classify the feed from the last update time
    pub fn from_last_update(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match last_update {
            None => Self::Waiting,
            Some(last) => {
                if (now - last).num_seconds() < CONNECTED_WINDOW_SECS {
                    Self::Connected
                } else {
                    Self::Disconnected
                }
            }
        }
    }

    /// Badge text shown on the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connected => "● Live",
            Self::Disconnected => "● Offline",
            Self::Waiting => "● Waiting for data",
        }
    }

    /// Badge style; waiting shares the offline styling
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected | Self::Waiting => "disconnected",
        }
    }
}

/// Color band for a speed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedBand {
    Low,
    Medium,
    High,
}

impl SpeedBand {
    /// Band for a speed in mph
    pub fn for_speed(speed: f64) -> Self {
        if speed < BAND_MEDIUM_MPH {
            Self::Low
        } else if speed < BAND_HIGH_MPH {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Text color class for the big speed readout
    pub fn color_class(&self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "yellow",
            Self::High => "red",
        }
    }

    /// Fill class for a history chart bar
    pub fn bar_class(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
