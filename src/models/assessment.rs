use serde::{Deserialize, Serialize};

/// Output of one scoring rule: a bounded score and the alerts that fired,
/// in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Score, already clamped to the rule's cap
    pub score: u32,

    /// Human-readable alerts, deterministic order
    pub alerts: Vec<String>,
}

impl RiskAssessment {
    /// Clamp `score` to `cap` and attach the alerts that fired.
    pub fn capped(score: u32, cap: u32, alerts: Vec<String>) -> Self {
        Self {
            score: score.min(cap),
            alerts,
        }
    }

    /// An assessment that contributes nothing
    pub fn empty() -> Self {
        Self {
            score: 0,
            alerts: Vec::new(),
        }
    }
}
