//! Repository for the `import_records` table.

use pipecheck_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use sqlx::PgPool;

use crate::models::import_record::{CreateImportRecord, ImportRecord};

/// Column list for import_records queries.
const COLUMNS: &str = "id, filename, file_type, file_size, created, updated, \
    defects_created, error_count, imported_at";

/// Provides operations for the import history ledger.
pub struct ImportRecordRepo;

impl ImportRecordRepo {
    /// Append a completed import to the ledger, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateImportRecord,
    ) -> Result<ImportRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_records
                (filename, file_type, file_size, created, updated, defects_created, error_count)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(&input.filename)
            .bind(&input.file_type)
            .bind(input.file_size)
            .bind(input.created)
            .bind(input.updated)
            .bind(input.defects_created)
            .bind(input.error_count)
            .fetch_one(pool)
            .await
    }

    /// List import records, newest first.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ImportRecord>, sqlx::Error> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM import_records
             ORDER BY imported_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ImportRecord>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
