//! Repository for the `ml_metrics` table.

use pipecheck_core::search::{clamp_limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use sqlx::PgPool;

use crate::models::ml_metric::{CreateMlMetric, MlMetric};

/// Column list for ml_metrics queries.
const COLUMNS: &str = "id, training_accuracy, test_accuracy, train_samples, test_samples, \
    training_report, test_report, label_distribution, predicted_count, created_at";

/// Provides operations for classifier training metrics.
pub struct MlMetricRepo;

impl MlMetricRepo {
    /// Record the metrics of a training run, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMlMetric) -> Result<MlMetric, sqlx::Error> {
        let query = format!(
            "INSERT INTO ml_metrics
                (training_accuracy, test_accuracy, train_samples, test_samples,
                 training_report, test_report, label_distribution, predicted_count)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MlMetric>(&query)
            .bind(input.training_accuracy)
            .bind(input.test_accuracy)
            .bind(input.train_samples)
            .bind(input.test_samples)
            .bind(&input.training_report)
            .bind(&input.test_report)
            .bind(&input.label_distribution)
            .bind(input.predicted_count)
            .fetch_one(pool)
            .await
    }

    /// List metric records, newest first.
    pub async fn list(pool: &PgPool, limit: Option<i64>) -> Result<Vec<MlMetric>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let query = format!(
            "SELECT {COLUMNS} FROM ml_metrics
             ORDER BY created_at DESC, id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, MlMetric>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Fetch the most recent metric record, if any.
    pub async fn latest(pool: &PgPool) -> Result<Option<MlMetric>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ml_metrics
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, MlMetric>(&query)
            .fetch_optional(pool)
            .await
    }
}
