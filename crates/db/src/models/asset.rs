//! Asset model.

use pipecheck_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `assets` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Asset {
    pub id: DbId,
    pub name: String,
    pub asset_type: String,
    pub pipeline_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub install_year: Option<i32>,
    pub material: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new asset. `id` carries the externally assigned
/// identifier when the upload provides one; `None` lets the store
/// assign one.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub id: Option<DbId>,
    pub name: String,
    pub asset_type: String,
    pub pipeline_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub install_year: Option<i32>,
    pub material: Option<String>,
}

/// DTO for updating an existing asset in place. Name and coordinates
/// are always provided by a valid row; the remaining fields merge only
/// when present.
#[derive(Debug, Clone)]
pub struct AssetPatch {
    pub name: String,
    pub asset_type: Option<String>,
    pub pipeline_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub install_year: Option<i32>,
    pub material: Option<String>,
}
