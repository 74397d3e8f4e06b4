//! Handlers for classifier training metrics.

use axum::extract::{Query, State};
use axum::Json;
use pipecheck_db::models::ml_metric::MlMetric;
use pipecheck_db::repositories::MlMetricRepo;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the metrics listing.
#[derive(Debug, Deserialize)]
pub struct MetricsParams {
    pub limit: Option<i64>,
}

/// GET /api/v1/ml/metrics -- recent training runs, newest first.
pub async fn list_metrics(
    State(state): State<AppState>,
    Query(params): Query<MetricsParams>,
) -> AppResult<Json<DataResponse<Vec<MlMetric>>>> {
    let metrics = MlMetricRepo::list(&state.pool, params.limit).await?;
    Ok(Json(DataResponse { data: metrics }))
}

/// GET /api/v1/ml/metrics/latest -- the most recent training run.
///
/// When no run has been recorded yet, returns a zeroed placeholder
/// carrying an `"error"` marker instead of a 404, so dashboards can
/// render an empty state from the same shape.
pub async fn latest_metrics(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let latest = MlMetricRepo::latest(&state.pool).await?;

    let data = match latest {
        Some(metric) => serde_json::to_value(metric)
            .map_err(|e| crate::error::AppError::InternalError(e.to_string()))?,
        None => json!({
            "training_accuracy": 0.0,
            "test_accuracy": 0.0,
            "train_samples": 0,
            "test_samples": 0,
            "training_report": {},
            "test_report": {},
            "label_distribution": {},
            "predicted_count": 0,
            "error": "No metrics found",
        }),
    };

    Ok(Json(DataResponse { data }))
}
