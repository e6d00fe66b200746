//! # Telemetry Module
//!
//! In-memory aggregation of GPS readings.
//!
//! This module handles:
//! - The current fix (position, speed, altitude, satellites)
//! - Running statistics (peak speed, average moving speed, trip distance)
//! - A bounded FIFO history of speed samples
//! - Derived presentation state (connection status, speed bands)

pub mod status;

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Maximum number of speed samples retained in history
pub const HISTORY_CAP: usize = 500;

/// Speeds at or below this are GPS jitter, not movement (mph)
pub const MOVING_THRESHOLD_MPH: f64 = 0.5;

/// One parsed GPS record
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Ground speed in mph
    pub speed: f64,
    /// Altitude in meters
    pub altitude: f64,
    pub satellites: u32,
}

/// One retained history entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    pub time: DateTime<Utc>,
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Aggregated telemetry state
///
/// One instance exists per server process, created zeroed at startup and
/// mutated only through [`TelemetryState::apply`] and
/// [`TelemetryState::reset`]. Whether any reading has ever arrived is
/// exposed solely through `last_update` being `Some` or `None`.
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    pub latitude: f64,
    pub longitude: f64,
    /// Current speed in mph
    pub speed: f64,
    /// Altitude in meters; converted to feet at presentation time only
    pub altitude: f64,
    pub satellites: u32,
    /// Highest speed seen since the last reset
    pub peak_speed: f64,
    /// Mean of all moving samples (speed above the jitter threshold)
    pub avg_speed: f64,
    /// Carried and reset but not yet accumulated; distance-between-fixes
    /// integration needs a haversine step that is still future work
    pub trip_distance: f64,
    pub last_update: Option<DateTime<Utc>>,
    pub history: VecDeque<SpeedSample>,
}

impl TelemetryState {
    /// Create a zeroed state with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one reading into the state
    ///
    /// The timestamp is injected by the caller so the update logic stays
    /// deterministic under test.
    ///
    /// # Arguments
    ///
    /// * `reading` - The parsed GPS record
    /// * `now` - Arrival time of the reading
    ///
    /// The update order matters: the average is recomputed over the history
    /// as it stood *before* this reading was appended, plus the reading
    /// itself if it is moving.
    pub fn apply(&mut self, reading: GpsReading, now: DateTime<Utc>) {
        self.latitude = reading.latitude;
        self.longitude = reading.longitude;
        self.speed = reading.speed;
        self.altitude = reading.altitude;
        self.satellites = reading.satellites;
        self.last_update = Some(now);

        if reading.speed > self.peak_speed {
            self.peak_speed = reading.speed;
        }

        // Average over moving samples only; stationary jitter would drag it
        // toward zero. An all-stationary set leaves the previous average
        // in place rather than dividing by zero.
        let mut moving: Vec<f64> = self
            .history
            .iter()
            .map(|sample| sample.speed)
            .filter(|speed| *speed > MOVING_THRESHOLD_MPH)
            .collect();
        if reading.speed > MOVING_THRESHOLD_MPH {
            moving.push(reading.speed);
        }
        if !moving.is_empty() {
            self.avg_speed = moving.iter().sum::<f64>() / moving.len() as f64;
        }

        self.history.push_back(SpeedSample {
            time: now,
            speed: reading.speed,
            latitude: reading.latitude,
            longitude: reading.longitude,
        });
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    /// Zero the statistics and clear the history
    ///
    /// The current fix (position, speed, altitude, satellites) and
    /// `last_update` are left untouched; a reset clears the trip, not the
    /// connection.
    pub fn reset(&mut self) {
        self.peak_speed = 0.0;
        self.avg_speed = 0.0;
        self.trip_distance = 0.0;
        self.history.clear();
    }

    /// Owned copy of the state for rendering outside the lock
    pub fn snapshot(&self) -> TelemetryState {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, secs).unwrap()
    }

    fn reading(speed: f64) -> GpsReading {
        GpsReading {
            latitude: 37.123456,
            longitude: -122.654321,
            speed,
            altitude: 15.0,
            satellites: 8,
        }
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let state = TelemetryState::new();
        assert_eq!(state.latitude, 0.0);
        assert_eq!(state.longitude, 0.0);
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.altitude, 0.0);
        assert_eq!(state.satellites, 0);
        assert_eq!(state.peak_speed, 0.0);
        assert_eq!(state.avg_speed, 0.0);
        assert_eq!(state.trip_distance, 0.0);
        assert!(state.last_update.is_none());
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_apply_overwrites_current_fix() {
        let mut state = TelemetryState::new();
        state.apply(reading(42.5), at(0));

        assert_eq!(state.latitude, 37.123456);
        assert_eq!(state.longitude, -122.654321);
        assert_eq!(state.speed, 42.5);
        assert_eq!(state.altitude, 15.0);
        assert_eq!(state.satellites, 8);
        assert_eq!(state.last_update, Some(at(0)));
    }

    #[test]
    fn test_peak_speed_tracks_maximum() {
        let mut state = TelemetryState::new();
        for (i, speed) in [10.0, 35.5, 22.0, 35.4].iter().enumerate() {
            state.apply(reading(*speed), at(i as u32));
        }
        assert_eq!(state.peak_speed, 35.5);
    }

    #[test]
    fn test_peak_speed_not_lowered_by_slower_reading() {
        let mut state = TelemetryState::new();
        state.apply(reading(60.0), at(0));
        state.apply(reading(5.0), at(1));
        assert_eq!(state.peak_speed, 60.0);
        assert_eq!(state.speed, 5.0);
    }

    #[test]
    fn test_avg_speed_ignores_stationary_jitter() {
        let mut state = TelemetryState::new();
        for (i, speed) in [0.2, 10.0, 0.3, 20.0].iter().enumerate() {
            state.apply(reading(*speed), at(i as u32));
        }
        assert_eq!(state.avg_speed, 15.0);
    }

    #[test]
    fn test_avg_speed_unchanged_when_nothing_moving() {
        let mut state = TelemetryState::new();
        state.apply(reading(0.1), at(0));
        state.apply(reading(0.4), at(1));
        assert_eq!(state.avg_speed, 0.0);
    }

    #[test]
    fn test_avg_speed_survives_slowing_down() {
        let mut state = TelemetryState::new();
        state.apply(reading(10.0), at(0));
        state.apply(reading(0.2), at(1));
        // The stationary reading neither joins the average nor erases it
        assert_eq!(state.avg_speed, 10.0);
    }

    #[test]
    fn test_avg_speed_exactly_at_threshold_is_stationary() {
        let mut state = TelemetryState::new();
        state.apply(reading(MOVING_THRESHOLD_MPH), at(0));
        assert_eq!(state.avg_speed, 0.0);
    }

    #[test]
    fn test_history_appends_in_arrival_order() {
        let mut state = TelemetryState::new();
        for i in 0..5 {
            state.apply(reading(i as f64), at(i));
        }
        let speeds: Vec<f64> = state.history.iter().map(|s| s.speed).collect();
        assert_eq!(speeds, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_history_sample_carries_fix() {
        let mut state = TelemetryState::new();
        state.apply(reading(42.0), at(7));

        let sample = state.history.front().unwrap();
        assert_eq!(sample.time, at(7));
        assert_eq!(sample.speed, 42.0);
        assert_eq!(sample.latitude, 37.123456);
        assert_eq!(sample.longitude, -122.654321);
    }

    #[test]
    fn test_history_bounded_at_cap() {
        let mut state = TelemetryState::new();
        let total = HISTORY_CAP + 20;
        for i in 0..total {
            state.apply(reading(i as f64), at(0));
        }
        assert_eq!(state.history.len(), HISTORY_CAP);
        // Oldest-first eviction: the first 20 samples are gone
        assert_eq!(state.history.front().unwrap().speed, 20.0);
        assert_eq!(state.history.back().unwrap().speed, (total - 1) as f64);
    }

    #[test]
    fn test_reset_zeroes_statistics() {
        let mut state = TelemetryState::new();
        for i in 0..10 {
            state.apply(reading(30.0 + i as f64), at(i));
        }
        state.trip_distance = 12.5;
        state.reset();

        assert_eq!(state.peak_speed, 0.0);
        assert_eq!(state.avg_speed, 0.0);
        assert_eq!(state.trip_distance, 0.0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_reset_keeps_current_fix() {
        let mut state = TelemetryState::new();
        state.apply(reading(55.0), at(3));
        state.reset();

        assert_eq!(state.latitude, 37.123456);
        assert_eq!(state.longitude, -122.654321);
        assert_eq!(state.speed, 55.0);
        assert_eq!(state.altitude, 15.0);
        assert_eq!(state.satellites, 8);
        assert_eq!(state.last_update, Some(at(3)));
    }

    #[test]
    fn test_peak_resumes_after_reset() {
        let mut state = TelemetryState::new();
        state.apply(reading(80.0), at(0));
        state.reset();
        state.apply(reading(25.0), at(1));
        assert_eq!(state.peak_speed, 25.0);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut state = TelemetryState::new();
        state.apply(reading(42.0), at(0));

        let snapshot = state.snapshot();
        state.apply(reading(99.0), at(1));

        assert_eq!(snapshot.speed, 42.0);
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(state.history.len(), 2);
    }
}
