use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::providers::{TrafficData, TrafficProvider};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "tomtom";

/// Expected free-flow speed (km/h) per road classification
static ROAD_LIMITS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("MOTORWAY", 120.0),
        ("TRUNK", 100.0),
        ("PRIMARY", 80.0),
        ("SECONDARY", 60.0),
        ("TERTIARY", 50.0),
        ("RESIDENTIAL", 30.0),
        ("SERVICE", 20.0),
        ("LOCAL", 25.0),
        ("UNKNOWN", 50.0),
    ])
});

const DEFAULT_ROAD_LIMIT: f64 = 50.0;

/// TomTom flow-segment client
#[derive(Clone)]
pub struct TomTomFlowClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl TomTomFlowClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            AppError::Configuration(format!(
                "Traffic API key missing; set {}",
                config.api_key_env
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    /// Normalize a flow-segment payload into `TrafficData`.
    ///
    /// Reported speeds above the road-type limit are clamped to it, and a
    /// missing jam factor is approximated as `(1 - speed/limit) * 10`
    /// rounded to 2 decimals.
    pub fn normalize(payload: &Value) -> TrafficData {
        let segment = match payload.get("flowSegmentData") {
            Some(segment) => segment,
            None => {
                warn!("Flow payload missing flowSegmentData, degrading to neutral");
                return TrafficData::unavailable();
            }
        };

        let road_type = segment
            .get("roadType")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_uppercase();
        let expected_limit = ROAD_LIMITS
            .get(road_type.as_str())
            .copied()
            .unwrap_or(DEFAULT_ROAD_LIMIT);

        let speed = segment
            .get("currentSpeed")
            .and_then(Value::as_f64)
            .map(|s| s.min(expected_limit));

        let jam_factor = segment
            .get("jamFactor")
            .and_then(Value::as_f64)
            .or_else(|| speed.map(|s| ((1.0 - s / expected_limit) * 1000.0).round() / 100.0));

        TrafficData {
            speed,
            free_flow_speed: Some(expected_limit),
            road_type,
            jam_factor,
            confidence: segment.get("confidence").and_then(Value::as_f64),
        }
    }
}

#[async_trait]
impl TrafficProvider for TomTomFlowClient {
    async fn fetch(&self, coords: Coordinates) -> Result<TrafficData> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("point", format!("{},{}", coords.lat, coords.lng)),
                ("unit", "KMPH".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Traffic request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else {
                    AppError::Provider {
                        provider: PROVIDER_NAME.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(AppError::Provider {
                provider: PROVIDER_NAME.to_string(),
                message: format!("status {}: {}", status, body),
            });
        }

        let payload: Value = response.json().await.map_err(|e| AppError::Provider {
            provider: PROVIDER_NAME.to_string(),
            message: format!("invalid response body: {}", e),
        })?;

        let data = Self::normalize(&payload);
        debug!(
            lat = coords.lat,
            lng = coords.lng,
            road_type = %data.road_type,
            jam_factor = ?data.jam_factor,
            "Traffic data fetched"
        );

        Ok(data)
    }
}
