use crate::error::{AppError, Result};
use crate::models::{FeatureVector, RiskLabel, FEATURE_DIMENSION};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Random forest over the 5 numeric features
#[derive(Serialize, Deserialize)]
pub struct RiskClassifier {
    model: RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
    n_trees: u16,
    seed: u64,
}

impl RiskClassifier {
    /// Fit a seeded forest on a feature matrix and its labels.
    pub fn fit(features: &Array2<f64>, labels: &[RiskLabel], n_trees: u16, seed: u64) -> Result<Self> {
        let x = Self::ndarray_to_densematrix(features);
        let y: Vec<i32> = labels.iter().map(|l| l.to_index()).collect();

        let params = RandomForestClassifierParameters::default()
            .with_n_trees(n_trees)
            .with_seed(seed);

        let model = RandomForestClassifier::fit(&x, &y, params)
            .map_err(|e| AppError::Internal(format!("Failed to train random forest: {}", e)))?;

        Ok(Self {
            model,
            n_trees,
            seed,
        })
    }

    /// Predict labels for a feature matrix
    pub fn predict_batch(&self, features: &Array2<f64>) -> Result<Vec<RiskLabel>> {
        let x = Self::ndarray_to_densematrix(features);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Internal(format!("Prediction failed: {}", e)))?;

        Ok(predictions.iter().map(|&p| RiskLabel::from_index(p)).collect())
    }

    /// Predict the label for a single feature vector
    pub fn predict_one(&self, features: &FeatureVector) -> Result<RiskLabel> {
        let row = features.as_row();
        let x = Array2::from_shape_vec((1, FEATURE_DIMENSION), row.to_vec())
            .map_err(|e| AppError::Internal(format!("Failed to create feature array: {}", e)))?;

        let predictions = self.predict_batch(&x)?;
        predictions
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Empty prediction batch".to_string()))
    }

    /// Fraction of correct predictions on a held-out set
    pub fn accuracy(&self, features: &Array2<f64>, labels: &[RiskLabel]) -> Result<f64> {
        if labels.is_empty() {
            return Ok(0.0);
        }

        let predictions = self.predict_batch(features)?;
        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(p, t)| p == t)
            .count();

        Ok(correct as f64 / labels.len() as f64)
    }

    fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
        let shape = arr.shape();
        let data: Vec<f64> = arr.iter().copied().collect();
        DenseMatrix::new(shape[0], shape[1], data, false)
    }
}

/// A trained classifier bound to exactly one user, overwritten on
/// retraining. Serialized with bincode into the model store; content is
/// opaque everywhere else.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    /// The fitted classifier
    pub classifier: RiskClassifier,

    /// Training timestamp
    pub trained_at: DateTime<Utc>,

    /// Records the model was fitted and evaluated on
    pub samples_used: usize,

    /// Held-out accuracy (percentage, 2 decimals)
    pub accuracy: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeler;

    fn synthetic_dataset(n: usize) -> (Array2<f64>, Vec<RiskLabel>) {
        let mut rows = Vec::with_capacity(n * FEATURE_DIMENSION);
        let mut labels = Vec::with_capacity(n);

        for i in 0..n {
            let fv = FeatureVector {
                temperature: Some(10.0 + (i % 20) as f64),
                visibility: 2_000.0 + (i % 10) as f64 * 1_000.0,
                wind_speed: (i % 15) as f64,
                traffic_speed: 10.0 + (i % 8) as f64 * 10.0,
                jam_factor: (i % 10) as f64,
            };
            rows.extend_from_slice(&fv.as_row());
            labels.push(labeler::label(&fv));
        }

        (
            Array2::from_shape_vec((n, FEATURE_DIMENSION), rows).unwrap(),
            labels,
        )
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = synthetic_dataset(60);
        let classifier = RiskClassifier::fit(&x, &y, 20, 42).unwrap();

        let predictions = classifier.predict_batch(&x).unwrap();
        assert_eq!(predictions.len(), 60);

        let accuracy = classifier.accuracy(&x, &y).unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn test_predict_one_returns_single_label() {
        let (x, y) = synthetic_dataset(60);
        let classifier = RiskClassifier::fit(&x, &y, 20, 42).unwrap();

        let fv = FeatureVector {
            temperature: Some(15.0),
            visibility: 9_000.0,
            wind_speed: 2.0,
            traffic_speed: 70.0,
            jam_factor: 0.0,
        };

        let label = classifier.predict_one(&fv).unwrap();
        assert!(matches!(
            label,
            RiskLabel::Bajo | RiskLabel::Medio | RiskLabel::Alto
        ));
    }

    #[test]
    fn test_artifact_round_trips_through_bincode() {
        let (x, y) = synthetic_dataset(40);
        let classifier = RiskClassifier::fit(&x, &y, 10, 42).unwrap();
        let expected = classifier.predict_batch(&x).unwrap();

        let artifact = ModelArtifact {
            classifier,
            trained_at: Utc::now(),
            samples_used: 40,
            accuracy: 91.67,
        };

        let bytes = bincode::serialize(&artifact).unwrap();
        let restored: ModelArtifact = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.samples_used, 40);
        assert_eq!(restored.accuracy, 91.67);
        assert_eq!(restored.classifier.predict_batch(&x).unwrap(), expected);
    }

    #[test]
    fn test_empty_test_set_accuracy_is_zero() {
        let (x, y) = synthetic_dataset(40);
        let classifier = RiskClassifier::fit(&x, &y, 10, 42).unwrap();

        let empty = Array2::zeros((0, FEATURE_DIMENSION));
        assert_eq!(classifier.accuracy(&empty, &[]).unwrap(), 0.0);
    }
}
