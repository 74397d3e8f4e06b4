//! Inspection model.

use pipecheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `inspections` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Inspection {
    pub id: DbId,
    pub asset_id: DbId,
    pub inspected_at: Timestamp,
    pub method: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub quality_grade: Option<String>,
    pub criticality_label: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new inspection.
#[derive(Debug, Clone)]
pub struct NewInspection {
    pub asset_id: DbId,
    pub inspected_at: Timestamp,
    pub method: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub quality_grade: Option<String>,
    pub criticality_label: Option<String>,
}

/// One labeled inspection with its defect dimensions aggregated, as
/// reloaded for incremental classifier training.
#[derive(Debug, Clone, FromRow)]
pub struct LabeledInspectionRow {
    pub id: DbId,
    pub method: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub quality_grade: Option<String>,
    pub criticality_label: String,
    pub defect_found: bool,
    pub max_depth: Option<f64>,
    pub max_length: Option<f64>,
    pub max_width: Option<f64>,
}
