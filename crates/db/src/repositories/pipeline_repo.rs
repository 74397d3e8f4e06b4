//! Repository for the `pipelines` table.

use sqlx::PgPool;

use crate::models::pipeline::Pipeline;

/// Column list for pipelines queries.
const COLUMNS: &str = "id, description";

/// Provides operations for pipeline rows.
pub struct PipelineRepo;

impl PipelineRepo {
    /// Find a pipeline by its external identifier.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Pipeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pipelines WHERE id = $1");
        sqlx::query_as::<_, Pipeline>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return which of the given pipeline ids already exist. Runs on
    /// the batch transaction so the read and the inserts it guards see
    /// the same snapshot.
    pub async fn existing_ids_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ids: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT id FROM pipelines WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert a pipeline stub within a transaction. Does nothing if the
    /// id already exists.
    pub async fn insert_stub_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO pipelines (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
