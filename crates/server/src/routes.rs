use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use common::types::Health;
use service::availability::{AvailabilityService, ServicesParams};
use service::config::ConfigMap;
use service::descriptor::Availability;
use service::observability::encode_metrics;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<AvailabilityService>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Registration entry point: `false` when not serviceable, else the descriptor.
async fn ill_availability_services(
    State(state): State<AppState>,
    Json(params): Json<ServicesParams>,
) -> Json<Availability> {
    Json(state.availability.ill_availability_services(&params))
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigMap> {
    Json(state.availability.current_config())
}

async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<ConfigMap>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let keys = state.availability.replace_config(config).await?;
    info!(keys, "configuration replaced");
    Ok(Json(serde_json::json!({ "keys": keys })))
}

async fn reload_config(State(state): State<AppState>) -> Result<Json<serde_json::Value>, JsonApiError> {
    let keys = state.availability.reload().await?;
    info!(keys, "configuration reloaded");
    Ok(Json(serde_json::json!({ "keys": keys })))
}

async fn metrics() -> (StatusCode, String) {
    match encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Build the full application router: public, service and admin routes
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api = Router::new().route("/api/ill-availability/services", post(ill_availability_services));

    let admin_routes = Router::new()
        .route("/admin/config", get(get_config).put(put_config))
        .route("/admin/config/reload", post(reload_config));

    public
        .merge(api)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
