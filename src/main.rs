use saferoad::{
    api::{build_router, AppState},
    auth::JwtVerifier,
    config::Config,
    error::AppError,
    ml::{PredictionService, TrainingPipeline},
    processing::RiskProcessor,
    providers::{OpenWeatherClient, TomTomFlowClient, TomTomIncidentsClient},
    state::create_stores,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "saferoad={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });

    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting SafeRoad v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.state.backend);
    let (records, models) = create_stores(&config.state)?;
    tracing::info!("✅ Storage backend initialized");

    // Initialize provider clients
    let weather = Arc::new(OpenWeatherClient::new(&config.providers.weather)?);
    let traffic = Arc::new(TomTomFlowClient::new(&config.providers.traffic)?);
    let incidents = Arc::new(TomTomIncidentsClient::new(&config.providers.incidents)?);
    tracing::info!("✅ Provider clients initialized");

    // Initialize the train/predict lifecycle
    let trainer = TrainingPipeline::new(records.clone(), models.clone(), config.training.clone());
    let predictor = PredictionService::new(models);

    let processor = Arc::new(RiskProcessor::new(
        weather, traffic, incidents, records, trainer, predictor,
    ));
    tracing::info!("✅ Risk processor initialized");

    // Initialize token verification
    let secret = config.auth.jwt_secret().ok_or_else(|| {
        AppError::Configuration(format!(
            "JWT secret missing; set {}",
            config.auth.jwt_secret_env
        ))
    })?;
    let verifier = Arc::new(JwtVerifier::new(&secret));

    // Build HTTP router
    let app_state = AppState::new(processor, verifier);
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Risk check:   http://{}/v1/risk-check", http_addr);
    tracing::info!("   Model API:    http://{}/v1/model/train", http_addr);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
