//! Classifier metrics model.

use pipecheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ml_metrics` table. One is created per successful
/// training run.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MlMetric {
    pub id: DbId,
    pub training_accuracy: f64,
    pub test_accuracy: f64,
    pub train_samples: i32,
    pub test_samples: i32,
    pub training_report: serde_json::Value,
    pub test_report: serde_json::Value,
    pub label_distribution: serde_json::Value,
    pub predicted_count: i32,
    pub created_at: Timestamp,
}

/// DTO for persisting a new metrics record. Zero-valued fields when a
/// phase produced nothing.
#[derive(Debug, Clone)]
pub struct CreateMlMetric {
    pub training_accuracy: f64,
    pub test_accuracy: f64,
    pub train_samples: i32,
    pub test_samples: i32,
    pub training_report: serde_json::Value,
    pub test_report: serde_json::Value,
    pub label_distribution: serde_json::Value,
    pub predicted_count: i32,
}
