use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether criticality classifier artifacts are loaded. An
    /// untrained classifier is not degraded; the service predicts
    /// nothing until the first sufficient labeled import.
    pub classifier_trained: bool,
}

/// GET /health -- returns service, database, and classifier health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = pipecheck_db::health_check(&state.pool).await.is_ok();
    let classifier_trained = state.classifier.lock().await.is_trained();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        classifier_trained,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
