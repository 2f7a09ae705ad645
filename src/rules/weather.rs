use crate::features;
use crate::models::RiskAssessment;
use serde_json::Value;

/// Upper bound of the weather rule's contribution
pub const WEATHER_SCORE_CAP: u32 = 30;

/// Condition categories that score as dangerous on their own
const HAZARDOUS_CONDITIONS: [&str; 3] = ["rain", "snow", "thunderstorm"];

/// The weather fields the rule reads, with extraction-time defaults
/// already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Lowercased condition category, absent when the provider sent none
    pub condition: Option<String>,

    /// Air temperature (Celsius), unknown when absent
    pub temperature: Option<f64>,

    /// Visibility (meters)
    pub visibility: f64,

    /// Wind speed (m/s)
    pub wind_speed: f64,
}

impl WeatherSnapshot {
    /// Read the fixed paths out of a raw provider payload. A payload with
    /// no recognizable fields yields a snapshot that scores zero.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            condition: features::weather_condition(payload),
            temperature: features::weather_temperature(payload),
            visibility: features::weather_visibility(payload),
            wind_speed: features::weather_wind_speed(payload),
        }
    }
}

/// Score weather-related road risk.
///
/// Conditions are independent and additive, evaluated in a fixed order so
/// alert ordering is deterministic. Temperature checks are skipped when
/// the temperature is unknown.
pub fn score_weather(snapshot: &WeatherSnapshot) -> RiskAssessment {
    let mut score = 0u32;
    let mut alerts = Vec::new();

    if let Some(condition) = &snapshot.condition {
        if HAZARDOUS_CONDITIONS.contains(&condition.as_str()) {
            alerts.push(format!("dangerous weather: {}", condition));
            score += 12;
        }
    }

    if snapshot.visibility < 3_000.0 {
        alerts.push("low visibility".to_string());
        score += 8;
    }

    if let Some(temperature) = snapshot.temperature {
        if temperature < 5.0 {
            alerts.push("ice risk".to_string());
            score += 5;
        }
        if temperature > 33.0 {
            alerts.push("extreme heat — fatigue risk".to_string());
            score += 5;
        }
    }

    if snapshot.wind_speed > 30.0 {
        alerts.push("strong wind — risk for motorcycles/cyclists".to_string());
        score += 8;
    }

    RiskAssessment::capped(score, WEATHER_SCORE_CAP, alerts)
}
