use crate::api::AppState;
use crate::auth::UserContext;
use crate::error::{AppError, Result};
use crate::ml::{PredictOutcome, TrainOutcome};
use crate::models::{Coordinates, FeatureVector, ModelSource, RiskLabel, RiskRecord};
use crate::processing::RiskReport;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Coordinates as sent by clients; both fields are required
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl LocationRequest {
    fn into_coordinates(self) -> Result<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Coordinates { lat, lng }),
            _ => Err(AppError::Validation(
                "lat and lng are required".to_string(),
            )),
        }
    }
}

/// Run a full risk check at the given location
pub async fn risk_check(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<LocationRequest>,
) -> Result<Json<RiskReport>> {
    let coords = request.into_coordinates()?;
    let report = state.processor.check_risk(&user.user_id, coords).await?;
    Ok(Json(report))
}

/// List the caller's records, newest first
pub async fn history(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<HistoryResponse>> {
    let records = state.processor.history(&user.user_id).await?;
    Ok(Json(HistoryResponse {
        user: user.user_id,
        records,
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user: String,
    pub records: Vec<RiskRecord>,
}

/// Append a caller-reported outcome
pub async fn save_record(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<SaveRecordRequest>,
) -> Result<(StatusCode, Json<SaveRecordResponse>)> {
    let coords = Coordinates {
        lat: request.lat.ok_or_else(|| {
            AppError::Validation("lat and lng are required".to_string())
        })?,
        lng: request.lng.ok_or_else(|| {
            AppError::Validation("lat and lng are required".to_string())
        })?,
    };

    let record = RiskRecord::new(
        user.user_id,
        coords,
        request.features,
        request.score.unwrap_or(0),
        request.label,
        None,
    );
    let id = state.processor.save_record(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveRecordResponse {
            status: "ok".to_string(),
            id,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SaveRecordRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub features: FeatureVector,
    pub score: Option<u32>,
    /// Observed risk level; this is the ground truth training feeds on
    pub label: Option<RiskLabel>,
}

#[derive(Debug, Serialize)]
pub struct SaveRecordResponse {
    pub status: String,
    pub id: Uuid,
}

/// Nearby incidents passthrough
pub async fn incidents(
    State(state): State<AppState>,
    _user: UserContext,
    Query(request): Query<LocationRequest>,
) -> Result<Json<IncidentsResponse>> {
    let coords = request.into_coordinates()?;
    let incidents = state.processor.incidents_near(coords).await?;
    Ok(Json(IncidentsResponse { coords, incidents }))
}

#[derive(Debug, Serialize)]
pub struct IncidentsResponse {
    pub coords: Coordinates,
    pub incidents: serde_json::Value,
}

/// The caller's stored training data
pub async fn dataset(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<Json<DatasetResponse>> {
    let records = state.processor.dataset(&user.user_id).await?;

    let dataset: Vec<DatasetRow> = records
        .into_iter()
        .map(|record| DatasetRow {
            lat: record.coords.lat,
            lng: record.coords.lng,
            temperature: record.features.temperature,
            visibility: record.features.visibility,
            wind_speed: record.features.wind_speed,
            traffic_speed: record.features.traffic_speed,
            jam_factor: record.features.jam_factor,
            risk_score: record.score,
            risk_label: record.label,
            model: record.model_source,
        })
        .collect();

    Ok(Json(DatasetResponse {
        total_records: dataset.len(),
        dataset,
    }))
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub total_records: usize,
    pub dataset: Vec<DatasetRow>,
}

#[derive(Debug, Serialize)]
pub struct DatasetRow {
    pub lat: f64,
    pub lng: f64,
    pub temperature: Option<f64>,
    pub visibility: f64,
    pub wind_speed: f64,
    pub traffic_speed: f64,
    pub jam_factor: f64,
    pub risk_score: u32,
    pub risk_label: Option<RiskLabel>,
    pub model: Option<ModelSource>,
}

/// Train (or retrain) the caller's model
pub async fn train(
    State(state): State<AppState>,
    user: UserContext,
) -> Result<(StatusCode, Json<TrainOutcome>)> {
    let outcome = state.processor.train(&user.user_id).await?;

    let status = match &outcome {
        TrainOutcome::Trained(_) => StatusCode::OK,
        TrainOutcome::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };

    Ok((status, Json(outcome)))
}

/// Predict with the caller's trained model at the given location
pub async fn predict(
    State(state): State<AppState>,
    user: UserContext,
    Json(request): Json<LocationRequest>,
) -> Result<Json<PredictResponse>> {
    let coords = request.into_coordinates()?;
    let (input_used, prediction) = state.processor.predict_at(&user.user_id, coords).await?;

    Ok(Json(PredictResponse {
        coords,
        input_used,
        prediction,
    }))
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub coords: Coordinates,
    pub input_used: FeatureVector,
    pub prediction: PredictOutcome,
}
