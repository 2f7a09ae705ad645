use crate::error::Result;
use crate::features;
use crate::labeler;
use crate::ml::{PredictOutcome, PredictionService, TrainOutcome, TrainingPipeline};
use crate::models::{
    Coordinates, FeatureVector, ModelSource, RiskAssessment, RiskLabel, RiskRecord,
};
use crate::providers::{IncidentProvider, TrafficData, TrafficProvider, WeatherProvider};
use crate::rules::{score_traffic, score_weather, WeatherSnapshot};
use crate::state::RecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Full result of a risk check: both rule assessments, the extracted
/// features, and the verdict with the strategy that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub id: Uuid,
    pub coords: Coordinates,
    pub weather: serde_json::Value,
    pub traffic: TrafficData,
    pub weather_assessment: RiskAssessment,
    pub traffic_assessment: RiskAssessment,
    pub combined_score: u32,
    pub features: FeatureVector,
    pub predicted_risk: RiskLabel,
    pub model: ModelSource,
    pub created_at: DateTime<Utc>,
}

/// Orchestrates providers, rules, and the learned-model path.
///
/// The two risk strategies stay independent: rule scores are always
/// computed, and the verdict label comes from the user's model when one
/// exists, from the heuristic labeler otherwise.
pub struct RiskProcessor {
    weather: Arc<dyn WeatherProvider>,
    traffic: Arc<dyn TrafficProvider>,
    incidents: Arc<dyn IncidentProvider>,
    records: Arc<dyn RecordStore>,
    trainer: TrainingPipeline,
    predictor: PredictionService,
}

impl RiskProcessor {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        traffic: Arc<dyn TrafficProvider>,
        incidents: Arc<dyn IncidentProvider>,
        records: Arc<dyn RecordStore>,
        trainer: TrainingPipeline,
        predictor: PredictionService,
    ) -> Self {
        Self {
            weather,
            traffic,
            incidents,
            records,
            trainer,
            predictor,
        }
    }

    /// Run a full risk check for `user_id` at `coords` and persist the
    /// resulting record.
    ///
    /// The persisted record carries no label: a check's verdict is a
    /// prediction, not an outcome, and must never masquerade as ground
    /// truth for later training.
    pub async fn check_risk(&self, user_id: &str, coords: Coordinates) -> Result<RiskReport> {
        coords.validate()?;

        let (weather_payload, traffic_data) =
            tokio::try_join!(self.weather.fetch(coords), self.traffic.fetch(coords))?;

        let weather_assessment = score_weather(&WeatherSnapshot::from_payload(&weather_payload));
        let traffic_assessment = score_traffic(&traffic_data);
        let combined_score = weather_assessment.score + traffic_assessment.score;

        let feature_vector = features::extract(&weather_payload, &traffic_data);

        let (predicted_risk, model) = match self.predictor.predict(user_id, &feature_vector).await?
        {
            PredictOutcome::Predicted(prediction) => {
                (prediction.label, ModelSource::MachineLearning)
            }
            PredictOutcome::ModelNotTrained => {
                (labeler::label(&feature_vector), ModelSource::HeuristicRules)
            }
        };

        let record = RiskRecord::new(
            user_id.to_string(),
            coords,
            feature_vector.clone(),
            combined_score,
            None,
            Some(model),
        );
        let record_id = self.records.append_record(&record).await?;

        info!(
            user_id = %user_id,
            record_id = %record_id,
            combined_score = combined_score,
            predicted_risk = %predicted_risk,
            model = %model,
            "Risk check completed"
        );

        Ok(RiskReport {
            id: record_id,
            coords,
            weather: weather_payload,
            traffic: traffic_data,
            weather_assessment,
            traffic_assessment,
            combined_score,
            features: feature_vector,
            predicted_risk,
            model,
            created_at: record.created_at,
        })
    }

    /// Fetch fresh conditions and run single-shot inference for `user_id`.
    pub async fn predict_at(
        &self,
        user_id: &str,
        coords: Coordinates,
    ) -> Result<(FeatureVector, PredictOutcome)> {
        coords.validate()?;

        let (weather_payload, traffic_data) =
            tokio::try_join!(self.weather.fetch(coords), self.traffic.fetch(coords))?;

        let feature_vector = features::extract(&weather_payload, &traffic_data);
        let outcome = self.predictor.predict(user_id, &feature_vector).await?;

        Ok((feature_vector, outcome))
    }

    /// Train (or retrain) the model for `user_id`
    pub async fn train(&self, user_id: &str) -> Result<TrainOutcome> {
        self.trainer.train(user_id).await
    }

    /// Append a caller-provided record (a real outcome) for `user_id`
    pub async fn save_record(&self, record: RiskRecord) -> Result<Uuid> {
        self.records.append_record(&record).await
    }

    /// All of a user's records, newest first
    pub async fn history(&self, user_id: &str) -> Result<Vec<RiskRecord>> {
        let mut records = self.records.records_for_user(user_id).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// A user's records in training order (oldest first)
    pub async fn dataset(&self, user_id: &str) -> Result<Vec<RiskRecord>> {
        self.records.records_for_user(user_id).await
    }

    /// Raw incidents near `coords`
    pub async fn incidents_near(&self, coords: Coordinates) -> Result<serde_json::Value> {
        coords.validate()?;
        self.incidents.fetch(coords).await
    }
}
