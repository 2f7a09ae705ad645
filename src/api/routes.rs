use crate::api::{handlers, AppState};
use crate::auth;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        // Risk checks
        .route("/v1/risk-check", post(handlers::risk_check))
        // Records
        .route("/v1/history", get(handlers::history))
        .route("/v1/records", post(handlers::save_record))
        // Nearby incidents
        .route("/v1/incidents", get(handlers::incidents))
        // Model lifecycle
        .route("/v1/model/dataset", get(handlers::dataset))
        .route("/v1/model/train", post(handlers::train))
        .route("/v1/model/predict", post(handlers::predict))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        .merge(protected)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
