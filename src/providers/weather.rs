use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::providers::WeatherProvider;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const PROVIDER_NAME: &str = "openweathermap";

/// OpenWeatherMap current-weather client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenWeatherClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            AppError::Configuration(format!(
                "Weather API key missing; set {}",
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
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, coords: Coordinates) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lng.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Weather request timed out after {} seconds",
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

        let payload: serde_json::Value = response.json().await.map_err(|e| AppError::Provider {
            provider: PROVIDER_NAME.to_string(),
            message: format!("invalid response body: {}", e),
        })?;

        debug!(lat = coords.lat, lng = coords.lng, "Weather payload fetched");

        Ok(payload)
    }
}
