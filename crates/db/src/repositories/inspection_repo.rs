//! Repository for the `inspections` table.

use pipecheck_core::types::DbId;
use sqlx::PgPool;
use tracing::debug;

use crate::models::inspection::{Inspection, LabeledInspectionRow, NewInspection};

/// Column list for inspections queries.
const COLUMNS: &str = "id, asset_id, inspected_at, method, temperature, humidity, \
    illumination, quality_grade, criticality_label, created_at, updated_at";

/// Provides operations for inspection rows.
pub struct InspectionRepo;

impl InspectionRepo {
    /// Find an inspection by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Inspection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM inspections WHERE id = $1");
        sqlx::query_as::<_, Inspection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an inspection within a transaction, returning its id.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewInspection,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO inspections
                (asset_id, inspected_at, method, temperature, humidity, illumination,
                 quality_grade, criticality_label)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(input.asset_id)
        .bind(input.inspected_at)
        .bind(&input.method)
        .bind(input.temperature)
        .bind(input.humidity)
        .bind(input.illumination)
        .bind(&input.quality_grade)
        .bind(&input.criticality_label)
        .fetch_one(&mut **tx)
        .await
    }

    /// List all labeled inspections together with the largest recorded
    /// defect dimensions per inspection.
    pub async fn list_labeled_with_defect_dims(
        pool: &PgPool,
    ) -> Result<Vec<LabeledInspectionRow>, sqlx::Error> {
        sqlx::query_as::<_, LabeledInspectionRow>(
            "SELECT i.id, i.method, i.temperature, i.humidity, i.illumination,
                    i.quality_grade, i.criticality_label,
                    COUNT(d.id) > 0 AS defect_found,
                    MAX(d.depth) AS max_depth,
                    MAX(d.length) AS max_length,
                    MAX(d.width) AS max_width
             FROM inspections i
             LEFT JOIN defects d ON d.inspection_id = i.id
             WHERE i.criticality_label IS NOT NULL
             GROUP BY i.id
             ORDER BY i.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Write predicted labels onto inspections that are still
    /// unlabeled. Runs in its own transaction; returns the number of
    /// rows actually updated.
    pub async fn apply_labels(
        pool: &PgPool,
        labels: &[(DbId, String)],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut applied = 0u64;
        for (id, label) in labels {
            let result = sqlx::query(
                "UPDATE inspections SET criticality_label = $2, updated_at = now()
                 WHERE id = $1 AND criticality_label IS NULL",
            )
            .bind(id)
            .bind(label)
            .execute(&mut *tx)
            .await?;
            applied += result.rows_affected();
        }
        tx.commit().await?;
        debug!(applied, total = labels.len(), "applied predicted labels");
        Ok(applied)
    }
}
