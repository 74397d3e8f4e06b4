//! Repository for the `defects` table.

use crate::models::defect::{Defect, NewDefect};

/// Column list for defects queries.
const COLUMNS: &str = "id, inspection_id, defect_type, depth, length, width, \
    created_at, updated_at";

/// Provides operations for defect rows.
pub struct DefectRepo;

impl DefectRepo {
    /// Insert a defect within a transaction, returning the created row.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewDefect,
    ) -> Result<Defect, sqlx::Error> {
        let query = format!(
            "INSERT INTO defects (inspection_id, defect_type, depth, length, width)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Defect>(&query)
            .bind(input.inspection_id)
            .bind(&input.defect_type)
            .bind(input.depth)
            .bind(input.length)
            .bind(input.width)
            .fetch_one(&mut **tx)
            .await
    }
}
