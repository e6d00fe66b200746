//! # Frame Module
//!
//! Line protocol spoken by the GPS device over serial.
//!
//! A telemetry record is a single line of the form:
//!
//! ```text
//! GPS:<latitude>,<longitude>,<speed>,<altitude>,<satellites>
//! ```
//!
//! Everything else the device prints (boot banners, fix diagnostics) shares
//! the same stream, so classification is three-way: a parsed reading, a
//! malformed record to discard, or an unrecognized line to pass through to
//! the log.

use crate::telemetry::GpsReading;

/// Marker that starts every telemetry record
pub const FRAME_PREFIX: &str = "GPS:";

/// Number of comma-separated fields after the prefix
pub const FRAME_FIELDS: usize = 5;

/// Classification of one serial line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedLine {
    /// A well-formed telemetry record
    Reading(GpsReading),
    /// Started like a record but did not parse; drop it
    Malformed,
    /// Not a telemetry record at all; worth echoing to the log
    Unrecognized,
}

/// Classify one line from the serial stream
///
/// Returns `None` for blank lines, which carry nothing worth acting on.
/// A line with the `GPS:` prefix either parses into a [`GpsReading`] or is
/// [`ParsedLine::Malformed`]; parsing never fails the caller. Fields are
/// whitespace-trimmed before numeric parsing since devices pad freely.
pub fn parse_line(raw: &str) -> Option<ParsedLine> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let rest = match line.strip_prefix(FRAME_PREFIX) {
        Some(rest) => rest,
        None => return Some(ParsedLine::Unrecognized),
    };

    match parse_fields(rest) {
        Some(reading) => Some(ParsedLine::Reading(reading)),
        None => Some(ParsedLine::Malformed),
    }
}

/// Parse the payload fields in fixed order
fn parse_fields(rest: &str) -> Option<GpsReading> {
    let fields: Vec<&str> = rest.split(',').collect();
    if fields.len() != FRAME_FIELDS {
        return None;
    }

    Some(GpsReading {
        latitude: fields[0].trim().parse().ok()?,
        longitude: fields[1].trim().parse().ok()?,
        speed: fields[2].trim().parse().ok()?,
        altitude: fields[3].trim().parse().ok()?,
        satellites: fields[4].trim().parse().ok()?,
    })
}
