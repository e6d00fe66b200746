//! Server-side rendering of the dashboard page.
//!
//! The page is plain HTML that reloads itself via a refresh meta tag; no
//! client-side scripting. Two variants share the renderer: the full layout
//! with the statistics grid and speed bands, and a minimal layout that only
//! distinguishes moving from stationary.

use chrono::{DateTime, Local, Utc};

use crate::telemetry::status::{ConnectionStatus, SpeedBand};
use crate::telemetry::{TelemetryState, MOVING_THRESHOLD_MPH};

/// Seconds between automatic page reloads
pub const REFRESH_SECS: u32 = 2;

/// Number of history samples shown in the chart
pub const CHART_SAMPLES: usize = 60;

/// Speed that fills a chart bar completely (mph)
pub const CHART_FULL_SCALE_MPH: f64 = 100.0;

const FEET_PER_METER: f64 = 3.28084;

/// Which dashboard layout to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardVariant {
    /// Statistics grid and three-band speed coloring
    Full,
    /// No statistics grid; moving/stationary coloring only
    Minimal,
}

impl DashboardVariant {
    /// Parse a variant from its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "full" => Some(Self::Full),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }
}

const STYLE: &str = r#"
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1a1a1a;
            color: #fff;
            min-height: 100vh;
            padding: 40px;
        }
        .container {
            max-width: 800px;
            margin: 0 auto;
        }
        h1 {
            font-size: 24px;
            font-weight: 400;
            color: #888;
            margin-bottom: 20px;
        }
        .status {
            margin-bottom: 40px;
        }
        .speed-display {
            font-size: 120px;
            font-weight: 700;
            line-height: 1;
            margin-bottom: 10px;
        }
        .speed-unit {
            font-size: 36px;
            font-weight: 400;
            color: #888;
            margin-left: 10px;
        }
        .green { color: #8dc73f; }
        .yellow { color: #f0c040; }
        .red { color: #e74c3c; }
        .gray { color: #666; }

        .timestamp {
            font-size: 14px;
            color: #666;
            margin-bottom: 30px;
        }
        .stats {
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 30px;
            margin-bottom: 40px;
        }
        .stat {
            background: #252525;
            padding: 20px;
            border-radius: 8px;
        }
        .stat-label {
            font-size: 12px;
            color: #888;
            text-transform: uppercase;
            letter-spacing: 1px;
            margin-bottom: 8px;
        }
        .stat-value {
            font-size: 32px;
            font-weight: 600;
        }
        .stat-unit {
            font-size: 14px;
            color: #666;
            margin-left: 5px;
        }
        .location {
            background: #252525;
            padding: 20px;
            border-radius: 8px;
            margin-bottom: 40px;
        }
        .location-title {
            font-size: 12px;
            color: #888;
            text-transform: uppercase;
            letter-spacing: 1px;
            margin-bottom: 15px;
        }
        .coords {
            font-family: 'Monaco', 'Consolas', monospace;
            font-size: 18px;
            color: #8dc73f;
        }
        .altitude {
            margin-top: 10px;
            font-size: 16px;
            color: #f0c040;
        }
        .satellites {
            margin-top: 10px;
            font-size: 14px;
            color: #666;
        }
        .chart-section {
            margin-top: 40px;
        }
        .chart-title {
            font-size: 14px;
            color: #888;
            margin-bottom: 15px;
        }
        .chart {
            background: #252525;
            border-radius: 8px;
            padding: 20px;
            height: 150px;
            display: flex;
            align-items: flex-end;
            gap: 2px;
        }
        .bar {
            flex: 1;
            background: #8dc73f;
            min-height: 2px;
            border-radius: 2px 2px 0 0;
            transition: height 0.3s;
        }
        .bar.low { background: #8dc73f; }
        .bar.medium { background: #f0c040; }
        .bar.high { background: #e74c3c; }
        .bar.idle { background: #666; }

        .no-data {
            color: #666;
            font-style: italic;
        }
        .gps-status {
            display: inline-block;
            padding: 5px 12px;
            border-radius: 20px;
            font-size: 12px;
            font-weight: 600;
            text-transform: uppercase;
            margin-bottom: 20px;
        }
        .gps-status.connected { background: #2d5a1d; color: #8dc73f; }
        .gps-status.disconnected { background: #5a1d1d; color: #e74c3c; }
"#;

/// Render the dashboard from a snapshot
///
/// The timestamp is injected so freshness decisions render the same way
/// under test.
pub fn render(snapshot: &TelemetryState, variant: DashboardVariant, now: DateTime<Utc>) -> String {
    let mut page = String::with_capacity(8 * 1024);

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str("    <title>GPS Tracker</title>\n");
    page.push_str(&format!(
        "    <meta http-equiv=\"refresh\" content=\"{}\">\n",
        REFRESH_SECS
    ));
    page.push_str("    <style>");
    page.push_str(STYLE);
    page.push_str("    </style>\n</head>\n<body>\n");
    page.push_str("    <div class=\"container\">\n");
    page.push_str("        <h1>GPS Tracker</h1>\n\n");

    page.push_str(&status_badge(snapshot, now));
    page.push_str(&speed_display(snapshot, variant));
    page.push_str(&timestamp_line(snapshot));

    if variant == DashboardVariant::Full {
        page.push_str(&stats_grid(snapshot));
    }

    page.push_str(&location_card(snapshot));
    page.push_str(&history_chart(snapshot, variant));

    page.push_str("    </div>\n</body>\n</html>\n");
    page
}

fn status_badge(snapshot: &TelemetryState, now: DateTime<Utc>) -> String {
    let status = ConnectionStatus::from_last_update(snapshot.last_update, now);
    format!(
        "        <div class=\"gps-status {}\">{}</div>\n\n",
        status.css_class(),
        status.label()
    )
}

fn speed_display(snapshot: &TelemetryState, variant: DashboardVariant) -> String {
    let color = match variant {
        DashboardVariant::Full => SpeedBand::for_speed(snapshot.speed).color_class(),
        DashboardVariant::Minimal => {
            if snapshot.speed > MOVING_THRESHOLD_MPH {
                "green"
            } else {
                "gray"
            }
        }
    };

    format!(
        "        <div class=\"status\">\n            <div class=\"speed-display {}\">{:.0}<span class=\"speed-unit\">MPH</span></div>\n        </div>\n\n",
        color, snapshot.speed
    )
}

fn timestamp_line(snapshot: &TelemetryState) -> String {
    let text = match snapshot.last_update {
        Some(ts) => format!(
            "Last update: {}",
            ts.with_timezone(&Local).format("%I:%M:%S %p")
        ),
        None => "No data received yet".to_string(),
    };

    format!("        <div class=\"timestamp\">{}</div>\n\n", text)
}

fn stats_grid(snapshot: &TelemetryState) -> String {
    let mut grid = String::from("        <div class=\"stats\">\n");

    grid.push_str(&format!(
        "            <div class=\"stat\">\n                <div class=\"stat-label\">Peak Speed</div>\n                <div class=\"stat-value red\">{:.1}<span class=\"stat-unit\">MPH</span></div>\n            </div>\n",
        snapshot.peak_speed
    ));
    grid.push_str(&format!(
        "            <div class=\"stat\">\n                <div class=\"stat-label\">Average</div>\n                <div class=\"stat-value\" style=\"color: #3498db;\">{:.1}<span class=\"stat-unit\">MPH</span></div>\n            </div>\n",
        snapshot.avg_speed
    ));
    grid.push_str(&format!(
        "            <div class=\"stat\">\n                <div class=\"stat-label\">Trip Distance</div>\n                <div class=\"stat-value\" style=\"color: #9b59b6;\">{:.2}<span class=\"stat-unit\">mi</span></div>\n            </div>\n",
        snapshot.trip_distance
    ));

    grid.push_str("        </div>\n\n");
    grid
}

fn location_card(snapshot: &TelemetryState) -> String {
    let mut card = String::from(
        "        <div class=\"location\">\n            <div class=\"location-title\">Current Location</div>\n",
    );

    // (0, 0) means no fix has ever been reported
    if snapshot.latitude != 0.0 || snapshot.longitude != 0.0 {
        card.push_str(&format!(
            "            <div class=\"coords\">{:.6}, {:.6}</div>\n",
            snapshot.latitude, snapshot.longitude
        ));
        card.push_str(&format!(
            "            <div class=\"altitude\">↑ {:.0} ft</div>\n",
            snapshot.altitude * FEET_PER_METER
        ));
        card.push_str(&format!(
            "            <div class=\"satellites\">{} satellites</div>\n",
            snapshot.satellites
        ));
    } else {
        card.push_str("            <div class=\"no-data\">Waiting for GPS fix...</div>\n");
    }

    card.push_str("        </div>\n\n");
    card
}

fn history_chart(snapshot: &TelemetryState, variant: DashboardVariant) -> String {
    let mut section = String::from(
        "        <div class=\"chart-section\">\n            <div class=\"chart-title\">Speed History (last 60 readings)</div>\n            <div class=\"chart\">\n",
    );

    if snapshot.history.is_empty() {
        section.push_str(
            "                <div class=\"no-data\" style=\"margin: auto;\">No history yet</div>\n",
        );
    } else {
        let start = snapshot.history.len().saturating_sub(CHART_SAMPLES);
        for sample in snapshot.history.iter().skip(start) {
            let height = (sample.speed / CHART_FULL_SCALE_MPH * 100.0).min(100.0);
            let class = match variant {
                DashboardVariant::Full => SpeedBand::for_speed(sample.speed).bar_class(),
                DashboardVariant::Minimal => {
                    if sample.speed > MOVING_THRESHOLD_MPH {
                        "low"
                    } else {
                        "idle"
                    }
                }
            };

            section.push_str(&format!(
                "                <div class=\"bar {}\" style=\"height: {:.0}%;\" title=\"{:.1} MPH\"></div>\n",
                class, height, sample.speed
            ));
        }
    }

    section.push_str("            </div>\n        </div>\n");
    section
}
