use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::providers::IncidentProvider;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const PROVIDER_NAME: &str = "tomtom";

/// Bounding-box half-size (degrees) around the requested point
const BBOX_RADIUS_DEG: f64 = 0.1;

/// TomTom incident-details client
#[derive(Clone)]
pub struct TomTomIncidentsClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl TomTomIncidentsClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            AppError::Configuration(format!(
                "Incidents API key missing; set {}",
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
impl IncidentProvider for TomTomIncidentsClient {
    async fn fetch(&self, coords: Coordinates) -> Result<serde_json::Value> {
        let bbox = format!(
            "{},{},{},{}",
            coords.lng - BBOX_RADIUS_DEG,
            coords.lat - BBOX_RADIUS_DEG,
            coords.lng + BBOX_RADIUS_DEG,
            coords.lat + BBOX_RADIUS_DEG
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("bbox", bbox),
                (
                    "fields",
                    "id,geometry,properties,type,severity".to_string(),
                ),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Incidents request timed out after {} seconds",
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

        debug!(lat = coords.lat, lng = coords.lng, "Incidents fetched");

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_parses_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/incidents")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "test-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"incidents":[]}"#)
            .create_async()
            .await;

        std::env::set_var("TEST_INCIDENTS_KEY", "test-key");
        let config = ProviderConfig {
            base_url: format!("{}/incidents", server.url()),
            api_key_env: "TEST_INCIDENTS_KEY".to_string(),
            timeout_secs: 5,
        };
        let client = TomTomIncidentsClient::new(&config).unwrap();

        let payload = client
            .fetch(Coordinates { lat: 4.6, lng: -74.1 })
            .await
            .unwrap();

        assert!(payload["incidents"].as_array().unwrap().is_empty());
        mock.assert_async().await;
    }
}
