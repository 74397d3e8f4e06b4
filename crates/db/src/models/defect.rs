//! Defect model.

use pipecheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `defects` table. At most one is created per imported
/// inspection row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Defect {
    pub id: DbId,
    pub inspection_id: DbId,
    pub defect_type: Option<String>,
    pub depth: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new defect.
#[derive(Debug, Clone)]
pub struct NewDefect {
    pub inspection_id: DbId,
    pub defect_type: Option<String>,
    pub depth: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
}
