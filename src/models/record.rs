use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Number of numeric features in a vector
pub const FEATURE_DIMENSION: usize = 5;

/// Feature names, in classifier column order
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "temperature",
    "visibility",
    "wind_speed",
    "traffic_speed",
    "jam_factor",
];

/// Categorical risk level
///
/// Serialized with the Spanish labels the mobile clients expect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum RiskLabel {
    /// Low risk
    Bajo,
    /// Medium risk
    Medio,
    /// High risk
    Alto,
}

impl RiskLabel {
    /// Class index used by the classifier
    pub fn to_index(self) -> i32 {
        match self {
            RiskLabel::Bajo => 0,
            RiskLabel::Medio => 1,
            RiskLabel::Alto => 2,
        }
    }

    /// Class index back to label; out-of-range indices collapse to high
    /// risk, the conservative choice.
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => RiskLabel::Bajo,
            1 => RiskLabel::Medio,
            _ => RiskLabel::Alto,
        }
    }
}

/// The canonical numeric representation of one risk-assessment instance.
///
/// All defaulting happens when the vector is built from provider payloads
/// (see `crate::features`); downstream code never substitutes its own
/// defaults. `temperature` stays unknown when absent since no safe numeric
/// default exists for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Air temperature (Celsius), unknown when the provider omitted it
    pub temperature: Option<f64>,

    /// Visibility (meters)
    #[serde(default = "default_visibility")]
    pub visibility: f64,

    /// Wind speed (m/s)
    #[serde(default)]
    pub wind_speed: f64,

    /// Current traffic speed (km/h)
    #[serde(default)]
    pub traffic_speed: f64,

    /// Congestion severity, 0 to 10
    #[serde(default)]
    pub jam_factor: f64,
}

fn default_visibility() -> f64 {
    10_000.0
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            temperature: None,
            visibility: default_visibility(),
            wind_speed: 0.0,
            traffic_speed: 0.0,
            jam_factor: 0.0,
        }
    }
}

impl FeatureVector {
    /// Classifier input row, in `FEATURE_NAMES` order.
    ///
    /// An unknown temperature maps to 0.0 here; this is the convention the
    /// historical datasets were built with, so training and inference stay
    /// consistent.
    pub fn as_row(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.temperature.unwrap_or(0.0),
            self.visibility,
            self.wind_speed,
            self.traffic_speed,
            self.jam_factor,
        ]
    }
}

/// Geographic coordinates of a risk check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

/// Which strategy produced a risk verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ModelSource {
    /// Per-user trained classifier
    #[serde(rename = "Machine Learning")]
    #[strum(serialize = "Machine Learning")]
    MachineLearning,

    /// Hand-written heuristic rules
    #[serde(rename = "Fallback Rules")]
    #[strum(serialize = "Fallback Rules")]
    HeuristicRules,
}

/// One historical observation for a user
///
/// `label` is ground truth only when a real outcome was recorded; absent
/// labels are synthesized at training time and never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: String,

    /// Where the check happened
    pub coords: Coordinates,

    /// Extracted feature vector
    pub features: FeatureVector,

    /// Combined rule score at the time of the check
    pub score: u32,

    /// Recorded risk level, if any
    pub label: Option<RiskLabel>,

    /// Strategy that produced the verdict; absent on caller-reported
    /// outcomes
    pub model_source: Option<ModelSource>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RiskRecord {
    /// Create a new record owned by `user_id`
    pub fn new(
        user_id: String,
        coords: Coordinates,
        features: FeatureVector,
        score: u32,
        label: Option<RiskLabel>,
        model_source: Option<ModelSource>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            coords,
            features,
            score,
            label,
            model_source,
            created_at: Utc::now(),
        }
    }
}
