/// Integration tests for the per-user train/predict lifecycle
///
/// These tests verify the complete pipeline:
/// - Minimum sample count enforcement
/// - Heuristic label backfill during training
/// - Reproducible accuracy from the fixed seed
/// - Prediction against the persisted artifact
/// - Fallback signalling for untrained users
use saferoad::{
    config::TrainingConfig,
    ml::{PredictOutcome, PredictionService, TrainOutcome, TrainingPipeline},
    models::{Coordinates, FeatureVector, ModelSource, RiskLabel, RiskRecord},
    state::{InMemoryStore, ModelStore, RecordStore},
};
use std::sync::Arc;

fn test_features(i: usize) -> FeatureVector {
    FeatureVector {
        temperature: Some(5.0 + (i % 25) as f64),
        visibility: 2_000.0 + (i % 12) as f64 * 1_000.0,
        wind_speed: (i % 16) as f64,
        traffic_speed: 10.0 + (i % 9) as f64 * 10.0,
        jam_factor: (i % 10) as f64,
    }
}

fn test_record(user_id: &str, i: usize, label: Option<RiskLabel>) -> RiskRecord {
    RiskRecord::new(
        user_id.to_string(),
        Coordinates { lat: 4.6, lng: -74.1 },
        test_features(i),
        0,
        label,
        Some(ModelSource::HeuristicRules),
    )
}

fn setup_pipeline() -> (TrainingPipeline, PredictionService, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let records: Arc<dyn RecordStore> = store.clone();
    let models: Arc<dyn ModelStore> = store.clone();

    let pipeline = TrainingPipeline::new(records, models.clone(), TrainingConfig::default());
    let predictor = PredictionService::new(models);

    (pipeline, predictor, store)
}

async fn seed_records(store: &InMemoryStore, user_id: &str, count: usize) {
    for i in 0..count {
        store
            .append_record(&test_record(user_id, i, None))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_training_below_minimum_is_insufficient_data() {
    let (pipeline, _, store) = setup_pipeline();
    seed_records(&store, "alice", 29).await;

    let outcome = pipeline.train("alice").await.unwrap();

    assert_eq!(
        outcome,
        TrainOutcome::InsufficientData {
            required: 30,
            actual: 29
        }
    );
    assert!(store.load_model("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_training_at_minimum_succeeds() {
    let (pipeline, _, store) = setup_pipeline();
    seed_records(&store, "alice", 30).await;

    let outcome = pipeline.train("alice").await.unwrap();

    match outcome {
        TrainOutcome::Trained(report) => {
            assert_eq!(report.samples_used, 30);
            assert_eq!(report.synthesized_labels, 30);
            assert!((0.0..=100.0).contains(&report.accuracy));
        }
        other => panic!("expected a trained model, got {:?}", other),
    }

    let artifact = store.load_model("alice").await.unwrap().unwrap();
    assert_eq!(artifact.samples_used, 30);
}

#[tokio::test]
async fn test_training_is_reproducible() {
    let (pipeline, _, store) = setup_pipeline();
    seed_records(&store, "alice", 50).await;

    let first = pipeline.train("alice").await.unwrap();
    let second = pipeline.train("alice").await.unwrap();

    let (TrainOutcome::Trained(a), TrainOutcome::Trained(b)) = (first, second) else {
        panic!("both runs must train");
    };

    assert_eq!(a.accuracy, b.accuracy);
    assert_eq!(a.samples_used, b.samples_used);
    assert_eq!(a.synthesized_labels, b.synthesized_labels);
}

#[tokio::test]
async fn test_recorded_labels_are_not_resynthesized() {
    let (pipeline, _, store) = setup_pipeline();

    for i in 0..40 {
        let label = if i < 10 { Some(RiskLabel::Alto) } else { None };
        store
            .append_record(&test_record("alice", i, label))
            .await
            .unwrap();
    }

    let outcome = pipeline.train("alice").await.unwrap();

    match outcome {
        TrainOutcome::Trained(report) => {
            assert_eq!(report.samples_used, 40);
            assert_eq!(report.synthesized_labels, 30);
        }
        other => panic!("expected a trained model, got {:?}", other),
    }
}

#[tokio::test]
async fn test_predict_without_model_signals_not_trained() {
    let (_, predictor, _) = setup_pipeline();

    let outcome = predictor
        .predict("nobody", &test_features(0))
        .await
        .unwrap();

    assert_eq!(outcome, PredictOutcome::ModelNotTrained);
}

#[tokio::test]
async fn test_predict_after_training_returns_label_and_echo() {
    let (pipeline, predictor, store) = setup_pipeline();
    seed_records(&store, "alice", 60).await;

    pipeline.train("alice").await.unwrap();

    let features = test_features(3);
    let outcome = predictor.predict("alice", &features).await.unwrap();

    match outcome {
        PredictOutcome::Predicted(prediction) => {
            assert!(matches!(
                prediction.label,
                RiskLabel::Bajo | RiskLabel::Medio | RiskLabel::Alto
            ));
            assert_eq!(prediction.features, features);
        }
        other => panic!("expected a prediction, got {:?}", other),
    }
}

#[tokio::test]
async fn test_models_are_isolated_per_user() {
    let (pipeline, predictor, store) = setup_pipeline();
    seed_records(&store, "alice", 40).await;

    pipeline.train("alice").await.unwrap();

    // Bob has records but never trained; Alice's model must not leak.
    seed_records(&store, "bob", 40).await;
    let outcome = predictor.predict("bob", &test_features(0)).await.unwrap();
    assert_eq!(outcome, PredictOutcome::ModelNotTrained);
}

#[tokio::test]
async fn test_retraining_overwrites_previous_artifact() {
    let (pipeline, _, store) = setup_pipeline();
    seed_records(&store, "alice", 30).await;

    pipeline.train("alice").await.unwrap();
    let first = store.load_model("alice").await.unwrap().unwrap();

    seed_records(&store, "alice", 20).await;
    pipeline.train("alice").await.unwrap();
    let second = store.load_model("alice").await.unwrap().unwrap();

    assert_eq!(first.samples_used, 30);
    assert_eq!(second.samples_used, 50);
}

#[tokio::test]
async fn test_concurrent_training_for_same_user_serializes() {
    let (pipeline, _, store) = setup_pipeline();
    seed_records(&store, "alice", 40).await;

    let pipeline = Arc::new(pipeline);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.train("alice").await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, TrainOutcome::Trained(_)));
    }

    let artifact = store.load_model("alice").await.unwrap().unwrap();
    assert_eq!(artifact.samples_used, 40);
}
