//! Pipeline catalog entry model.

use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pipelines` table. Created lazily the first time an
/// asset references the id; never updated by the importers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pipeline {
    pub id: String,
    pub description: Option<String>,
}
