//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

use crate::auth::JwtKeys;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use tubely_processing::{
    IngestPipeline, PipelineSettings, PlaybackUrlSigner, ProcessRunner, TokioProcessRunner,
};
use tubely_storage::{create_storage, Storage};

/// Validate config, install tracing, connect backends and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let videos: Arc<dyn VideoRepository> = match config.database_url() {
        Some(url) => {
            let pool = database::setup_database(&config, url).await?;
            Arc::new(PgVideoRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set - video records are kept in memory only");
            Arc::new(InMemoryVideoRepository::new())
        }
    };

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        "Storage initialized"
    );

    let state = build_state(config.clone(), videos, storage, Arc::new(TokioProcessRunner));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Wire the shared state from its backends.
pub fn build_state(
    config: Config,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    runner: Arc<dyn ProcessRunner>,
) -> Arc<AppState> {
    let pipeline = IngestPipeline::new(
        videos.clone(),
        storage.clone(),
        runner,
        PipelineSettings::from_config(&config),
    );
    let signer = PlaybackUrlSigner::new(storage.clone());
    let jwt = Arc::new(JwtKeys::new(config.jwt_secret()));

    Arc::new(AppState {
        config,
        videos,
        storage,
        pipeline,
        signer,
        jwt,
    })
}
