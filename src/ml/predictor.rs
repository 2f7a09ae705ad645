use crate::error::Result;
use crate::models::{FeatureVector, RiskLabel};
use crate::state::ModelStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// A prediction plus the feature vector it was made from, echoed back so
/// callers can show what the model saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub label: RiskLabel,
    pub features: FeatureVector,
}

/// Outcome of a prediction request. An untrained user is an expected
/// state; callers fall back to the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictOutcome {
    Predicted(RiskPrediction),
    ModelNotTrained,
}

/// Single-shot inference against a user's persisted model. Never trains
/// implicitly.
pub struct PredictionService {
    models: Arc<dyn ModelStore>,
}

impl PredictionService {
    pub fn new(models: Arc<dyn ModelStore>) -> Self {
        Self { models }
    }

    /// Predict the risk label for `features` with `user_id`'s model.
    pub async fn predict(&self, user_id: &str, features: &FeatureVector) -> Result<PredictOutcome> {
        let artifact = match self.models.load_model(user_id).await? {
            Some(artifact) => artifact,
            None => {
                debug!(user_id = %user_id, "No trained model, signalling fallback");
                return Ok(PredictOutcome::ModelNotTrained);
            }
        };

        let label = artifact.classifier.predict_one(features)?;

        debug!(user_id = %user_id, label = %label, "Model prediction");

        Ok(PredictOutcome::Predicted(RiskPrediction {
            label,
            features: features.clone(),
        }))
    }
}
