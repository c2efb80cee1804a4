use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use pasargis_ingest::IngestPipeline;
use pasargis_store::MemoryLayerStore;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pasargis_api::{create_router, ApiConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pasargis_api=info,pasargis_ingest=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env().context("Failed to load configuration")?;

    tracing::info!(
        port = config.port,
        converter_program = %config.ingest.converter_program,
        converter_script = %config.ingest.converter_script.display(),
        timeout_secs = config.ingest.convert_timeout.as_secs(),
        workspace_root = %config.ingest.workspace_root.display(),
        "Starting Pasar GIS API server"
    );

    if !config.ingest.converter_script.is_file() {
        tracing::warn!(
            script = %config.ingest.converter_script.display(),
            "Conversion script not found; .zip uploads will fail until it is installed"
        );
    }

    tracing::info!("Using in-memory layer storage");
    let state = Arc::new(AppState::new(
        Arc::new(MemoryLayerStore::new()),
        IngestPipeline::from_settings(&config.ingest),
        config.ingest.max_upload_bytes,
    ));

    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(state).layer(cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
