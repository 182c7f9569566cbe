use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tracing::{Level, info};

use catalog_server::config::{AppConfig, CorsConfig};
use catalog_server::state::AppState;
use catalog_server::{build_router, database, seed};
use common::storage::filesystem::FilesystemAssetStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let store = FilesystemAssetStore::new(
        config.storage.public_root.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize asset store")?;
    info!(public_root = %config.storage.public_root.display(), "Asset store ready");

    let cors = build_cors(&config.server.cors).context("Invalid CORS origin")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        store: Arc::new(store),
        config: Arc::new(config),
    };
    let app = build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors(config: &CorsConfig) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origins = config
        .allow_origins
        .iter()
        .map(|o| o.parse())
        .collect::<Result<Vec<HeaderValue>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.max_age)))
}
