//! Repository for the `assets` table.

use pipecheck_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset::{Asset, AssetPatch, NewAsset};

/// Column list for assets queries.
const COLUMNS: &str = "id, name, asset_type, pipeline_id, latitude, longitude, \
    install_year, material, created_at, updated_at";

/// Provides operations for asset rows.
pub struct AssetRepo;

impl AssetRepo {
    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return which of the given asset ids already exist. Runs on the
    /// batch transaction so the read and the writes it guards see the
    /// same snapshot.
    pub async fn existing_ids_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM assets WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert an asset within a transaction, returning the created row.
    ///
    /// When the input carries an explicit id the row is created under
    /// that id; otherwise the store assigns one.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewAsset,
    ) -> Result<Asset, sqlx::Error> {
        if let Some(id) = input.id {
            let query = format!(
                "INSERT INTO assets
                    (id, name, asset_type, pipeline_id, latitude, longitude, install_year, material)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING {COLUMNS}"
            );
            sqlx::query_as::<_, Asset>(&query)
                .bind(id)
                .bind(&input.name)
                .bind(&input.asset_type)
                .bind(&input.pipeline_id)
                .bind(input.latitude)
                .bind(input.longitude)
                .bind(input.install_year)
                .bind(&input.material)
                .fetch_one(&mut **tx)
                .await
        } else {
            let query = format!(
                "INSERT INTO assets
                    (name, asset_type, pipeline_id, latitude, longitude, install_year, material)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING {COLUMNS}"
            );
            sqlx::query_as::<_, Asset>(&query)
                .bind(&input.name)
                .bind(&input.asset_type)
                .bind(&input.pipeline_id)
                .bind(input.latitude)
                .bind(input.longitude)
                .bind(input.install_year)
                .bind(&input.material)
                .fetch_one(&mut **tx)
                .await
        }
    }

    /// Update an existing asset within a transaction. Optional fields
    /// keep their stored value when the patch omits them.
    pub async fn update_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        patch: &AssetPatch,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET
                name = $2,
                asset_type = COALESCE($3, asset_type),
                pipeline_id = COALESCE($4, pipeline_id),
                latitude = $5,
                longitude = $6,
                install_year = COALESCE($7, install_year),
                material = COALESCE($8, material),
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.asset_type)
            .bind(&patch.pipeline_id)
            .bind(patch.latitude)
            .bind(patch.longitude)
            .bind(patch.install_year)
            .bind(&patch.material)
            .fetch_optional(&mut **tx)
            .await
    }
}
