pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /imports/upload        upload one asset or inspection file (POST)
/// /imports               import history, newest first (GET)
/// /ml/metrics            recent training metrics (GET)
/// /ml/metrics/latest     most recent training metrics (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/imports/upload", post(handlers::imports::upload_file))
        .route("/imports", get(handlers::imports::list_imports))
        .route("/ml/metrics", get(handlers::ml_metrics::list_metrics))
        .route(
            "/ml/metrics/latest",
            get(handlers::ml_metrics::latest_metrics),
        )
}
