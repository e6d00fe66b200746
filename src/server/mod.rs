//! # Server Module
//!
//! HTTP surface of the tracker.
//!
//! This module handles:
//! - Lenient query-parameter ingest (`/api/gps/update`)
//! - Snapshot JSON (`/api/gps/data`) and statistics reset (`/api/reset`)
//! - The auto-refreshing HTML dashboard (`/`)
//! - Health check (`/health`)

pub mod dashboard;

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::de::Error;
use tracing::info;
use warp::Filter;

use crate::config::ServerConfig;
use crate::error::{GpsTrackerError, Result};
use crate::telemetry::{GpsReading, TelemetryState};
use dashboard::DashboardVariant;

/// Telemetry state shared between request handlers
pub type SharedState = Arc<Mutex<TelemetryState>>;

/// Create a fresh zeroed shared state
pub fn shared_state() -> SharedState {
    Arc::new(Mutex::new(TelemetryState::new()))
}

/// Lock the shared state, recovering from poisoning
///
/// A panic in one handler must not take the whole dashboard down; the
/// state is plain data and stays usable.
fn lock_state(state: &SharedState) -> MutexGuard<'_, TelemetryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Health check response structure
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Acknowledgement body for ingest and reset
#[derive(serde::Serialize)]
struct StatusResponse {
    status: &'static str,
}

/// Snapshot body served by `/api/gps/data`
#[derive(serde::Serialize)]
struct DataResponse {
    lat: f64,
    lon: f64,
    speed: f64,
    altitude: f64,
    satellites: u32,
    peak_speed: f64,
    avg_speed: f64,
    last_update: Option<String>,
}

impl DataResponse {
    fn from_snapshot(snapshot: &TelemetryState) -> Self {
        Self {
            lat: snapshot.latitude,
            lon: snapshot.longitude,
            speed: snapshot.speed,
            altitude: snapshot.altitude,
            satellites: snapshot.satellites,
            peak_speed: snapshot.peak_speed,
            avg_speed: snapshot.avg_speed,
            last_update: snapshot.last_update.map(|t| t.to_rfc3339()),
        }
    }
}

/// Build a reading from ingest query parameters
///
/// Every parameter is optional; absent or non-numeric values fall back to
/// zero. The device is the only client, and a half-broken record is still
/// better shown than dropped at this point.
fn reading_from_params(params: &HashMap<String, String>) -> GpsReading {
    GpsReading {
        latitude: param_f64(params, "lat"),
        longitude: param_f64(params, "lon"),
        speed: param_f64(params, "speed"),
        altitude: param_f64(params, "altitude"),
        satellites: param_u32(params, "satellites"),
    }
}

fn param_f64(params: &HashMap<String, String>, key: &str) -> f64 {
    params
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0.0)
}

fn param_u32(params: &HashMap<String, String>, key: &str) -> u32 {
    params
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Compose all routes over the shared state
pub fn routes(
    state: SharedState,
    variant: DashboardVariant,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let update_route = warp::path!("api" / "gps" / "update")
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state.clone())
        .map(|params: HashMap<String, String>, state: SharedState| {
            let reading = reading_from_params(&params);
            lock_state(&state).apply(reading, Utc::now());

            info!(
                "GPS Update: {:.1} MPH @ ({:.6}, {:.6})",
                reading.speed, reading.latitude, reading.longitude
            );

            warp::reply::json(&StatusResponse { status: "ok" })
        });

    let data_route = warp::path!("api" / "gps" / "data")
        .and(with_state.clone())
        .map(|state: SharedState| {
            let snapshot = lock_state(&state).snapshot();
            warp::reply::json(&DataResponse::from_snapshot(&snapshot))
        });

    let reset_route = warp::path!("api" / "reset")
        .and(with_state.clone())
        .map(|state: SharedState| {
            lock_state(&state).reset();
            info!("Statistics reset");
            warp::reply::json(&StatusResponse { status: "reset" })
        });

    let health_route = warp::path("health").map(|| {
        let response = HealthResponse {
            status: "healthy",
            service: "gps-tracker",
            version: env!("CARGO_PKG_VERSION"),
        };
        warp::reply::json(&response)
    });

    let dashboard_route = warp::path::end()
        .and(with_state)
        .map(move |state: SharedState| {
            let snapshot = lock_state(&state).snapshot();
            warp::reply::html(dashboard::render(&snapshot, variant, Utc::now()))
        });

    update_route
        .or(data_route)
        .or(reset_route)
        .or(health_route)
        .or(dashboard_route)
}

/// Serve the dashboard until the process is stopped
///
/// # Arguments
///
/// * `config` - Bind address, port, and dashboard variant
/// * `state` - Shared telemetry state
///
/// # Errors
///
/// Returns error if the bind address cannot be parsed
pub async fn run(config: &ServerConfig, state: SharedState) -> Result<()> {
    let address: IpAddr = config.bind_address.parse().map_err(|_| {
        GpsTrackerError::Config(toml::de::Error::custom(format!(
            "invalid bind address: {}",
            config.bind_address
        )))
    })?;

    let variant = DashboardVariant::from_name(&config.dashboard).unwrap_or(DashboardVariant::Full);

    info!("Dashboard server starting on {}:{}", address, config.port);

    warp::serve(routes(state, variant))
        .run((address, config.port))
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn get(path: &str, state: &SharedState) -> warp::http::Response<warp::hyper::body::Bytes> {
        let routes = routes(state.clone(), DashboardVariant::Full);
        warp::test::request().path(path).reply(&routes).await
    }

    fn body_json(response: &warp::http::Response<warp::hyper::body::Bytes>) -> serde_json::Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_reading_from_all_params() {
        let reading = reading_from_params(&params(&[
            ("lat", "37.1"),
            ("lon", "-122.2"),
            ("speed", "55.0"),
            ("altitude", "10.0"),
            ("satellites", "8"),
        ]));

        assert_eq!(reading.latitude, 37.1);
        assert_eq!(reading.longitude, -122.2);
        assert_eq!(reading.speed, 55.0);
        assert_eq!(reading.altitude, 10.0);
        assert_eq!(reading.satellites, 8);
    }

    #[test]
    fn test_reading_from_no_params() {
        let reading = reading_from_params(&params(&[]));
        assert_eq!(reading, GpsReading::default());
    }

    #[test]
    fn test_reading_from_partial_params() {
        let reading = reading_from_params(&params(&[("speed", "42.5")]));

        assert_eq!(reading.speed, 42.5);
        assert_eq!(reading.latitude, 0.0);
        assert_eq!(reading.longitude, 0.0);
        assert_eq!(reading.altitude, 0.0);
        assert_eq!(reading.satellites, 0);
    }

    #[test]
    fn test_reading_from_non_numeric_params() {
        let reading = reading_from_params(&params(&[
            ("lat", "north"),
            ("speed", ""),
            ("satellites", "many"),
        ]));

        assert_eq!(reading, GpsReading::default());
    }

    #[tokio::test]
    async fn test_update_endpoint_returns_ok() {
        let state = shared_state();
        let response = get(
            "/api/gps/update?lat=37.1&lon=-122.2&speed=55.0&altitude=10.0&satellites=8",
            &state,
        )
        .await;

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["status"], "ok");

        let snapshot = lock_state(&state).snapshot();
        assert_eq!(snapshot.speed, 55.0);
        assert_eq!(snapshot.peak_speed, 55.0);
        assert_eq!(snapshot.history.len(), 1);
    }

    #[tokio::test]
    async fn test_update_endpoint_without_params_still_ok() {
        let state = shared_state();
        let response = get("/api/gps/update", &state).await;

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["status"], "ok");

        let snapshot = lock_state(&state).snapshot();
        assert!(snapshot.last_update.is_some());
        assert_eq!(snapshot.speed, 0.0);
    }

    #[tokio::test]
    async fn test_update_endpoint_coerces_garbage() {
        let state = shared_state();
        let response = get("/api/gps/update?speed=fast&lat=37.1", &state).await;

        assert_eq!(response.status(), 200);

        let snapshot = lock_state(&state).snapshot();
        assert_eq!(snapshot.speed, 0.0);
        assert_eq!(snapshot.latitude, 37.1);
    }

    #[tokio::test]
    async fn test_data_endpoint_before_any_update() {
        let state = shared_state();
        let response = get("/api/gps/data", &state).await;

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["last_update"], serde_json::Value::Null);
        assert_eq!(body["speed"], 0.0);
        assert_eq!(body["satellites"], 0);
    }

    #[tokio::test]
    async fn test_data_endpoint_reflects_update() {
        let state = shared_state();
        get(
            "/api/gps/update?lat=37.1&lon=-122.2&speed=55.0&altitude=10.0&satellites=8",
            &state,
        )
        .await;

        let response = get("/api/gps/data", &state).await;
        let body = body_json(&response);

        assert_eq!(body["lat"], 37.1);
        assert_eq!(body["lon"], -122.2);
        assert_eq!(body["speed"], 55.0);
        assert_eq!(body["peak_speed"], 55.0);
        assert!(body["last_update"].is_string());
    }

    #[tokio::test]
    async fn test_reset_endpoint_clears_statistics() {
        let state = shared_state();
        get("/api/gps/update?speed=70.0", &state).await;

        let response = get("/api/reset", &state).await;
        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["status"], "reset");

        let snapshot = lock_state(&state).snapshot();
        assert_eq!(snapshot.peak_speed, 0.0);
        assert!(snapshot.history.is_empty());
        // The current fix survives a reset
        assert_eq!(snapshot.speed, 70.0);
        assert!(snapshot.last_update.is_some());
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = shared_state();
        let response = get("/health", &state).await;

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "gps-tracker");
    }

    #[tokio::test]
    async fn test_dashboard_served_at_root() {
        let state = shared_state();
        let response = get("/", &state).await;

        assert_eq!(response.status(), 200);
        let html = String::from_utf8_lossy(response.body()).to_string();
        assert!(html.contains("GPS Tracker"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let state = shared_state();
        let response = get("/api/gps/unknown", &state).await;
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let state = shared_state();

        // Poison the mutex by panicking while holding it
        let poisoner = state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("handler panicked while holding the state lock");
        })
        .join();
        assert!(state.lock().is_err());

        // Ingest and snapshot still work through lock_state
        let reading = reading_from_params(&params(&[("speed", "42.5")]));
        lock_state(&state).apply(reading, Utc::now());

        let snapshot = lock_state(&state).snapshot();
        assert_eq!(snapshot.speed, 42.5);
        assert!(snapshot.last_update.is_some());
    }
}
