use crate::labeler;
use crate::models::{RiskLabel, RiskRecord, FEATURE_DIMENSION};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Feature matrix plus labels assembled from a user's records.
///
/// Records without a recorded label get one synthesized by the heuristic
/// labeler; recorded labels are never touched.
#[derive(Debug, Clone)]
pub struct TrainingDataset {
    /// Feature matrix (n_samples x FEATURE_DIMENSION)
    pub features: Array2<f64>,

    /// One label per row
    pub labels: Vec<RiskLabel>,

    /// How many labels were synthesized during assembly
    pub synthesized_labels: usize,

    /// Number of samples
    pub n_samples: usize,
}

impl TrainingDataset {
    /// Assemble a dataset from records, backfilling missing labels.
    pub fn from_records(records: &[RiskRecord]) -> Self {
        let n_samples = records.len();
        let mut features = Array2::zeros((n_samples, FEATURE_DIMENSION));
        let mut labels = Vec::with_capacity(n_samples);
        let mut synthesized_labels = 0;

        for (i, record) in records.iter().enumerate() {
            for (j, value) in record.features.as_row().iter().enumerate() {
                features[[i, j]] = *value;
            }

            let label = match record.label {
                Some(label) => label,
                None => {
                    synthesized_labels += 1;
                    labeler::label(&record.features)
                }
            };
            labels.push(label);
        }

        Self {
            features,
            labels,
            synthesized_labels,
            n_samples,
        }
    }

    /// Split into (train, test) partitions.
    ///
    /// The shuffle is driven by `seed` alone, so the same dataset always
    /// produces the same partitions and therefore the same reported
    /// accuracy.
    pub fn split(&self, test_fraction: f64, seed: u64) -> (TrainingDataset, TrainingDataset) {
        let n_test = ((self.n_samples as f64) * test_fraction).ceil() as usize;

        let mut indices: Vec<usize> = (0..self.n_samples).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_indices, train_indices) = indices.split_at(n_test);
        (self.subset(train_indices), self.subset(test_indices))
    }

    fn subset(&self, indices: &[usize]) -> TrainingDataset {
        TrainingDataset {
            features: self.features.select(Axis(0), indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            // Synthesis accounting stays on the parent dataset.
            synthesized_labels: 0,
            n_samples: indices.len(),
        }
    }
}
