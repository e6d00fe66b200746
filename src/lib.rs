//! # GPS Tracker Library
//!
//! Live speed dashboard and serial bridge for GPS telemetry.
//!
//! This library provides the core functionality for aggregating GPS readings
//! into an in-memory snapshot, serving it as a dashboard and JSON API, and
//! bridging a serial-attached GPS device to that server.

pub mod bridge;
pub mod config;
pub mod error;
pub mod frame;
pub mod serial;
pub mod server;
pub mod telemetry;
