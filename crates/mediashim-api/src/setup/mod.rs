//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediashim_core::UploadConfig;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: UploadConfig) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        backend = %config.media_backend,
        "Configuration loaded and validated successfully"
    );

    let media_service = mediashim_storage::create_media_service(&config)
        .context("Failed to create media service")?;

    let state = Arc::new(AppState::new(config, media_service));
    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
