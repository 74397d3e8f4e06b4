//! Import history ledger model.

use pipecheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `import_records` table. Append-only; one per
/// completed import attempt.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImportRecord {
    pub id: DbId,
    pub filename: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub created: i32,
    pub updated: i32,
    pub defects_created: i32,
    pub error_count: i32,
    pub imported_at: Timestamp,
}

/// DTO for appending a new import record.
#[derive(Debug, Clone)]
pub struct CreateImportRecord {
    pub filename: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub created: i32,
    pub updated: i32,
    pub defects_created: i32,
    pub error_count: i32,
}
