//! Stateless risk-scoring rules.
//!
//! A closed set of two pure functions sharing the `(context) ->
//! RiskAssessment` shape: weather conditions (capped at 30 points) and
//! traffic flow (capped at 50 points). Assessments are independent and the
//! caller sums their scores.

mod traffic;
mod weather;

pub use traffic::{score_traffic, TRAFFIC_SCORE_CAP};
pub use weather::{score_weather, WeatherSnapshot, WEATHER_SCORE_CAP};
