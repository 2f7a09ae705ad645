//! Heuristic risk labeling.
//!
//! Deterministic fallback used to backfill training records that never got
//! a real outcome, and as the rule-based verdict when a user has no
//! trained model yet. A present label is never overridden.

use crate::models::{FeatureVector, RiskLabel};

/// Map a feature vector to a risk label, strict order, first match wins.
pub fn label(features: &FeatureVector) -> RiskLabel {
    if features.visibility < 4_000.0
        || features.wind_speed > 12.0
        || features.traffic_speed < 20.0
    {
        return RiskLabel::Alto;
    }

    if features.traffic_speed < 50.0 || features.wind_speed > 8.0 {
        return RiskLabel::Medio;
    }

    RiskLabel::Bajo
}
