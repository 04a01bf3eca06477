use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::availability::AvailabilityService;
use service::config::FileConfigSource;
use service::descriptor::{DescriptorBuilder, ServiceIdentity};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Load the configuration blob and assemble the router state.
/// Fails when the blob cannot be loaded.
pub async fn build_state(cfg: &AppConfig) -> Result<AppState, StartupError> {
    common::env::ensure_config_dir(&cfg.storage.config_path).await?;

    let source = Arc::new(FileConfigSource::new(&cfg.storage.config_path));
    let builder = DescriptorBuilder::new(ServiceIdentity::from(&cfg.service))
        .require_metadata_match(cfg.resolver.require_metadata_match);
    let availability = AvailabilityService::load(source, builder).await?;

    Ok(AppState { availability: Arc::new(availability) })
}

pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Build the app from an already loaded process config and serve it.
/// Logging and `.env` are the caller's concern.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    info!(
        config_path = %cfg.storage.config_path,
        service = %cfg.service.name,
        version = %cfg.service.version,
        require_metadata_match = cfg.resolver.require_metadata_match,
        "starting availability server"
    );

    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
