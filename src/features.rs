//! Feature extraction from raw provider payloads.
//!
//! Every default lives here: downstream scoring and classification receive
//! a fully-populated [`FeatureVector`] and never substitute their own
//! fallbacks. Temperature is the one field without a safe default and is
//! propagated as unknown.

use crate::models::FeatureVector;
use crate::providers::TrafficData;
use serde_json::Value;

/// Visibility assumed when the provider omits the field (meters)
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;

/// Air temperature in Celsius, unknown when absent or non-numeric
pub fn weather_temperature(payload: &Value) -> Option<f64> {
    payload.pointer("/main/temp").and_then(Value::as_f64)
}

/// Visibility in meters
pub fn weather_visibility(payload: &Value) -> f64 {
    payload
        .get("visibility")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_VISIBILITY_M)
}

/// Wind speed in m/s
pub fn weather_wind_speed(payload: &Value) -> f64 {
    payload
        .pointer("/wind/speed")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Lowercased weather condition category (`rain`, `snow`, ...), absent
/// when the payload carries none.
pub fn weather_condition(payload: &Value) -> Option<String> {
    payload
        .pointer("/weather/0/main")
        .and_then(Value::as_str)
        .map(|s| s.to_lowercase())
}

/// Normalize one weather payload and one traffic reading into the
/// canonical feature vector. Never fails on missing optional fields.
pub fn extract(weather: &Value, traffic: &TrafficData) -> FeatureVector {
    FeatureVector {
        temperature: weather_temperature(weather),
        visibility: weather_visibility(weather),
        wind_speed: weather_wind_speed(weather),
        traffic_speed: traffic.speed.unwrap_or(0.0),
        jam_factor: traffic.jam_factor.unwrap_or(0.0),
    }
}
