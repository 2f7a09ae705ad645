use crate::models::RiskAssessment;
use crate::providers::TrafficData;

/// Upper bound of the traffic rule's contribution
pub const TRAFFIC_SCORE_CAP: u32 = 50;

/// Confidence below which the reading itself becomes a risk factor
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.50;

/// Score congestion-related road risk.
///
/// Without both a current and a free-flow speed there is nothing to
/// reason about: the rule short-circuits to a zero score with a single
/// alert. The base score is `jam_factor * 5`, and jam alerts are mutually
/// exclusive, first match wins from most to least severe.
pub fn score_traffic(traffic: &TrafficData) -> RiskAssessment {
    if traffic.speed.is_none() || traffic.free_flow_speed.is_none() {
        return RiskAssessment {
            score: 0,
            alerts: vec!["no reliable traffic data".to_string()],
        };
    }

    let mut alerts = Vec::new();
    let mut score = (traffic.jam_factor.unwrap_or(0.0).clamp(0.0, 10.0) * 5.0) as u32;

    if let Some(jam) = traffic.jam_factor {
        if jam >= 8.0 {
            alerts.push("severe congestion".to_string());
        } else if jam >= 5.0 {
            alerts.push("heavy traffic".to_string());
        } else if jam >= 3.0 {
            alerts.push("slow circulation".to_string());
        }
    }

    if traffic.confidence.unwrap_or(1.0) < LOW_CONFIDENCE_THRESHOLD {
        alerts.push("unreliable data — verify real traffic conditions".to_string());
        score += 5;
    }

    RiskAssessment::capped(score, TRAFFIC_SCORE_CAP, alerts)
}
