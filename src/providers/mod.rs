pub mod incidents;
pub mod traffic;
pub mod weather;

pub use incidents::TomTomIncidentsClient;
pub use traffic::TomTomFlowClient;
pub use weather::OpenWeatherClient;

use crate::error::Result;
use crate::models::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Weather provider collaborator: raw current-conditions payload for a
/// location. The payload shape is provider-defined; the feature extractor
/// and the weather rule read fixed paths out of it with explicit defaults.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, coords: Coordinates) -> Result<serde_json::Value>;
}

/// Traffic provider collaborator: normalized flow data for a location.
///
/// The adapter owns the road-type speed limits, the clamp of implausible
/// reported speeds, and the jam-factor approximation when the upstream
/// omits it; the core never sees a missing jam factor on a payload that
/// had usable speeds.
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    async fn fetch(&self, coords: Coordinates) -> Result<TrafficData>;
}

/// Incident provider collaborator: raw incident list near a location.
#[async_trait]
pub trait IncidentProvider: Send + Sync {
    async fn fetch(&self, coords: Coordinates) -> Result<serde_json::Value>;
}

/// Normalized traffic flow data
///
/// `speed` and `free_flow_speed` stay `None` when the upstream had no
/// usable segment; the traffic rule short-circuits on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficData {
    /// Current speed (km/h), clamped to the road-type limit
    pub speed: Option<f64>,

    /// Expected free-flow speed for the road type (km/h)
    pub free_flow_speed: Option<f64>,

    /// Upstream road classification, uppercase, "UNKNOWN" when absent
    pub road_type: String,

    /// Congestion severity 0 to 10, computed from speeds when absent
    pub jam_factor: Option<f64>,

    /// Upstream confidence in the reading, 0 to 1
    pub confidence: Option<f64>,
}

impl TrafficData {
    /// Data with no usable reading; rules degrade to neutral on this.
    pub fn unavailable() -> Self {
        Self {
            speed: None,
            free_flow_speed: None,
            road_type: "UNKNOWN".to_string(),
            jam_factor: None,
            confidence: None,
        }
    }
}
