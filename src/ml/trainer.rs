use crate::config::TrainingConfig;
use crate::error::Result;
use crate::ml::classifier::{ModelArtifact, RiskClassifier};
use crate::ml::dataset::TrainingDataset;
use crate::state::{ModelStore, RecordStore};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Result of a successful training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Held-out accuracy (percentage, 2 decimals)
    pub accuracy: f64,

    /// Records used
    pub samples_used: usize,

    /// Labels synthesized by the heuristic labeler
    pub synthesized_labels: usize,
}

/// Outcome of a training request. Too little data is an expected state,
/// not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrainOutcome {
    Trained(TrainingReport),
    InsufficientData { required: usize, actual: usize },
}

/// Per-user train lifecycle around the record and model stores.
///
/// Training runs for the same user are serialized through a keyed mutex
/// so concurrent requests cannot race on the stored artifact; different
/// users train independently.
pub struct TrainingPipeline {
    records: Arc<dyn RecordStore>,
    models: Arc<dyn ModelStore>,
    config: TrainingConfig,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl TrainingPipeline {
    pub fn new(
        records: Arc<dyn RecordStore>,
        models: Arc<dyn ModelStore>,
        config: TrainingConfig,
    ) -> Self {
        Self {
            records,
            models,
            config,
            in_flight: DashMap::new(),
        }
    }

    /// Train (or retrain) the model for `user_id`.
    ///
    /// Overwrites any previous artifact. Re-running on the same dataset
    /// reproduces the same model and accuracy: the split and the forest
    /// are both driven by the configured seed.
    pub async fn train(&self, user_id: &str) -> Result<TrainOutcome> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let records = self.records.records_for_user(user_id).await?;

        if records.len() < self.config.min_samples {
            warn!(
                user_id = %user_id,
                actual = records.len(),
                required = self.config.min_samples,
                "Not enough records to train"
            );
            return Ok(TrainOutcome::InsufficientData {
                required: self.config.min_samples,
                actual: records.len(),
            });
        }

        let dataset = TrainingDataset::from_records(&records);
        let (train, test) = dataset.split(self.config.test_split, self.config.seed);

        let classifier = RiskClassifier::fit(
            &train.features,
            &train.labels,
            self.config.n_trees,
            self.config.seed,
        )?;

        let accuracy = round2(classifier.accuracy(&test.features, &test.labels)? * 100.0);

        let artifact = ModelArtifact {
            classifier,
            trained_at: Utc::now(),
            samples_used: dataset.n_samples,
            accuracy,
        };

        self.models.save_model(user_id, &artifact).await?;

        info!(
            user_id = %user_id,
            accuracy = accuracy,
            samples_used = dataset.n_samples,
            synthesized_labels = dataset.synthesized_labels,
            "Model trained"
        );

        Ok(TrainOutcome::Trained(TrainingReport {
            accuracy,
            samples_used: dataset.n_samples,
            synthesized_labels: dataset.synthesized_labels,
        }))
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
