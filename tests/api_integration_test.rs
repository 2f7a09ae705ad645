/// Integration tests for the HTTP surface: bearer auth, request
/// validation, and the mapping of lifecycle outcomes to responses.
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use saferoad::{
    api::{build_router, AppState},
    auth::{Claims, JwtVerifier},
    config::TrainingConfig,
    error::Result,
    ml::{PredictionService, TrainingPipeline},
    models::Coordinates,
    processing::RiskProcessor,
    providers::{IncidentProvider, TrafficData, TrafficProvider, WeatherProvider},
    state::{InMemoryStore, ModelStore, RecordStore},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const TEST_SECRET: &str = "test-secret";

struct StubWeather;

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn fetch(&self, _coords: Coordinates) -> Result<Value> {
        Ok(json!({
            "weather": [{"main": "Rain"}],
            "main": {"temp": 2},
            "visibility": 2000,
            "wind": {"speed": 5}
        }))
    }
}

struct StubTraffic;

#[async_trait]
impl TrafficProvider for StubTraffic {
    async fn fetch(&self, _coords: Coordinates) -> Result<TrafficData> {
        Ok(TrafficData {
            speed: Some(35.0),
            free_flow_speed: Some(60.0),
            road_type: "SECONDARY".to_string(),
            jam_factor: Some(4.0),
            confidence: Some(0.9),
        })
    }
}

struct StubIncidents;

#[async_trait]
impl IncidentProvider for StubIncidents {
    async fn fetch(&self, _coords: Coordinates) -> Result<Value> {
        Ok(json!({"incidents": []}))
    }
}

fn test_app() -> axum::Router {
    let store = Arc::new(InMemoryStore::new());
    let records: Arc<dyn RecordStore> = store.clone();
    let models: Arc<dyn ModelStore> = store;

    let processor = Arc::new(RiskProcessor::new(
        Arc::new(StubWeather),
        Arc::new(StubTraffic),
        Arc::new(StubIncidents),
        records.clone(),
        TrainingPipeline::new(records, models.clone(), TrainingConfig::default()),
        PredictionService::new(models),
    ));

    let verifier = Arc::new(JwtVerifier::new(TEST_SECRET));
    build_router(AppState::new(processor, verifier))
}

fn bearer(sub: &str) -> String {
    let token = encode(
        &Header::default(),
        &Claims {
            sub: sub.to_string(),
            exp: 4_102_444_800,
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_risk_check_requires_token() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/risk-check")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"lat":4.6,"lng":-74.1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn test_risk_check_rejects_missing_coordinates() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/risk-check")
                .header(header::AUTHORIZATION, bearer("alice"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"lat":4.6}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_risk_check_rejects_out_of_range_coordinates() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/risk-check")
                .header(header::AUTHORIZATION, bearer("alice"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"lat":120.0,"lng":-74.1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_risk_check_returns_full_report() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/risk-check")
                .header(header::AUTHORIZATION, bearer("alice"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"lat":4.6,"lng":-74.1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // 12 (rain) + 8 (visibility) + 5 (ice) = 25 weather, 4 * 5 = 20 traffic
    assert_eq!(body["weather_assessment"]["score"], 25);
    assert_eq!(body["traffic_assessment"]["score"], 20);
    assert_eq!(body["combined_score"], 45);
    // Visibility 2000 is below the labeler's 4000 threshold.
    assert_eq!(body["model"], "Fallback Rules");
    assert_eq!(body["predicted_risk"], "Alto");
}

#[tokio::test]
async fn test_train_without_enough_data_is_unprocessable() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/model/train")
                .header(header::AUTHORIZATION, bearer("alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["status"], "insufficient_data");
    assert_eq!(body["required"], 30);
    assert_eq!(body["actual"], 0);
}

#[tokio::test]
async fn test_predict_without_model_signals_fallback() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::post("/v1/model/predict")
                .header(header::AUTHORIZATION, bearer("alice"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"lat":4.6,"lng":-74.1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["prediction"]["status"], "model_not_trained");
    assert_eq!(body["input_used"]["traffic_speed"], 35.0);
}

#[tokio::test]
async fn test_history_reflects_risk_checks() {
    let app = test_app();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::post("/v1/risk-check")
                    .header(header::AUTHORIZATION, bearer("alice"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"lat":4.6,"lng":-74.1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::get("/v1/history")
                .header(header::AUTHORIZATION, bearer("alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"], "alice");
    assert_eq!(body["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_save_record_stores_reported_outcome() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::post("/v1/records")
                .header(header::AUTHORIZATION, bearer("alice"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"lat":4.6,"lng":-74.1,"features":{"visibility":5000.0,"wind_speed":3.0,"traffic_speed":45.0},"label":"Medio"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::get("/v1/model/dataset")
                .header(header::AUTHORIZATION, bearer("alice"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["total_records"], 1);
    assert_eq!(body["dataset"][0]["risk_label"], "Medio");
    assert_eq!(body["dataset"][0]["traffic_speed"], 45.0);
}
