//! Asset file importer.

use std::collections::{HashMap, HashSet};

use pipecheck_core::ingest::decode::Dataset;
use pipecheck_core::ingest::normalize::parse_text_opt;
use pipecheck_core::ingest::rows::{parse_asset_row, ColumnIndex};
use pipecheck_core::ingest::RowError;
use pipecheck_db::models::asset::{AssetPatch, NewAsset};
use pipecheck_db::repositories::{AssetRepo, PipelineRepo};
use pipecheck_db::DbPool;
use tracing::info;

use super::{row_number, ImportOutcome};
use crate::error::AppResult;

/// Created/updated accounting for asset rows.
///
/// An explicit id that appears on several rows of one batch is counted
/// once, by its final disposition: an asset created early in the batch
/// and rewritten by a later row counts as updated, not both. Rows
/// without an id each count as created.
#[derive(Debug, Default)]
struct AssetTally {
    implicit_created: i32,
    explicit: HashMap<i64, RowDisposition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum RowDisposition {
    Created,
    Updated,
}

impl AssetTally {
    fn record_created(&mut self, id: Option<i64>) {
        match id {
            Some(id) => {
                self.explicit.insert(id, RowDisposition::Created);
            }
            None => self.implicit_created += 1,
        }
    }

    fn record_updated(&mut self, id: i64) {
        self.explicit.insert(id, RowDisposition::Updated);
    }

    fn created(&self) -> i32 {
        let explicit = self
            .explicit
            .values()
            .filter(|d| **d == RowDisposition::Created)
            .count();
        self.implicit_created + explicit as i32
    }

    fn updated(&self) -> i32 {
        self.explicit
            .values()
            .filter(|d| **d == RowDisposition::Updated)
            .count() as i32
    }
}

/// Import an asset dataset in one transaction.
///
/// Rows with an explicit id that already exists are updated in place;
/// everything else is inserted. Row validation failures are collected
/// and skipped; any persistence failure rolls the whole batch back.
pub async fn import_assets(pool: &DbPool, dataset: &Dataset) -> AppResult<ImportOutcome> {
    let index = ColumnIndex::new(dataset);
    let mut tx = pool.begin().await?;

    // Pipeline pre-pass: create stubs for referenced but unknown ids.
    let referenced: Vec<String> = {
        let mut seen = HashSet::new();
        dataset
            .rows
            .iter()
            .filter_map(|row| parse_text_opt(index.cell(row, "pipeline_id")))
            .filter(|id| seen.insert(id.clone()))
            .collect()
    };
    if !referenced.is_empty() {
        let existing: HashSet<String> = PipelineRepo::existing_ids_tx(&mut tx, &referenced)
            .await?
            .into_iter()
            .collect();
        for id in referenced.iter().filter(|id| !existing.contains(*id)) {
            PipelineRepo::insert_stub_tx(&mut tx, id).await?;
        }
    }

    // Bulk existence pre-check over the explicit asset ids.
    let explicit_ids: Vec<i64> = {
        let mut seen = HashSet::new();
        dataset
            .rows
            .iter()
            .filter_map(|row| {
                pipecheck_core::ingest::normalize::parse_id_opt(index.cell(row, "asset_id"), "asset_id")
                    .ok()
                    .flatten()
            })
            .filter(|id| seen.insert(*id))
            .collect()
    };
    let mut existing_assets: HashSet<i64> = if explicit_ids.is_empty() {
        HashSet::new()
    } else {
        AssetRepo::existing_ids_tx(&mut tx, &explicit_ids)
            .await?
            .into_iter()
            .collect()
    };

    let mut outcome = ImportOutcome::default();
    let mut tally = AssetTally::default();

    for (i, row) in dataset.rows.iter().enumerate() {
        let draft = match parse_asset_row(&index, row) {
            Ok(draft) => draft,
            Err(error) => {
                outcome.errors.push(RowError {
                    row: row_number(i),
                    error,
                });
                continue;
            }
        };

        match draft.asset_id {
            Some(id) if existing_assets.contains(&id) => {
                AssetRepo::update_tx(
                    &mut tx,
                    id,
                    &AssetPatch {
                        name: draft.name,
                        asset_type: draft.asset_type.map(|t| t.as_str().to_string()),
                        pipeline_id: draft.pipeline_id,
                        latitude: draft.latitude,
                        longitude: draft.longitude,
                        install_year: draft.install_year,
                        material: draft.material,
                    },
                )
                .await?;
                tally.record_updated(id);
            }
            explicit_id => {
                // Creation needs a type; updates may omit it.
                let Some(asset_type) = draft.asset_type else {
                    outcome.errors.push(RowError {
                        row: row_number(i),
                        error: "object_type is required".to_string(),
                    });
                    continue;
                };
                let created = AssetRepo::insert_tx(
                    &mut tx,
                    &NewAsset {
                        id: explicit_id,
                        name: draft.name,
                        asset_type: asset_type.as_str().to_string(),
                        pipeline_id: draft.pipeline_id,
                        latitude: draft.latitude,
                        longitude: draft.longitude,
                        install_year: draft.install_year,
                        material: draft.material,
                    },
                )
                .await?;
                // A later row with the same explicit id updates instead
                // of colliding on the primary key.
                existing_assets.insert(created.id);
                tally.record_created(explicit_id);
            }
        }
    }

    outcome.created = tally.created();
    outcome.updated = tally.updated();

    tx.commit().await?;
    info!(
        created = outcome.created,
        updated = outcome.updated,
        errors = outcome.errors.len(),
        "asset import committed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_id_in_batch_counts_once_by_final_disposition() {
        // Empty store, rows: create 1, create 2, rewrite 1.
        let mut tally = AssetTally::default();
        tally.record_created(Some(1));
        tally.record_created(Some(2));
        tally.record_updated(1);

        assert_eq!(tally.created(), 1);
        assert_eq!(tally.updated(), 1);
    }

    #[test]
    fn existing_id_updated_twice_counts_once() {
        let mut tally = AssetTally::default();
        tally.record_updated(7);
        tally.record_updated(7);

        assert_eq!(tally.created(), 0);
        assert_eq!(tally.updated(), 1);
    }

    #[test]
    fn rows_without_an_id_each_count_as_created() {
        let mut tally = AssetTally::default();
        tally.record_created(None);
        tally.record_created(None);

        assert_eq!(tally.created(), 2);
        assert_eq!(tally.updated(), 0);
    }
}
