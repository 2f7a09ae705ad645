//! Per-user adaptive risk classification.
//!
//! One random forest per user, trained on that user's historical records
//! and persisted through the model store. Absent models and undersized
//! datasets are expected steady states and surface as outcome variants,
//! never as errors.

pub mod classifier;
pub mod dataset;
pub mod predictor;
pub mod trainer;

pub use classifier::{ModelArtifact, RiskClassifier};
pub use dataset::TrainingDataset;
pub use predictor::{PredictOutcome, PredictionService, RiskPrediction};
pub use trainer::{TrainOutcome, TrainingPipeline, TrainingReport};
