//! Inspection file importer.

use std::collections::HashSet;

use pipecheck_core::ingest::decode::Dataset;
use pipecheck_core::ingest::normalize::parse_id_opt;
use pipecheck_core::ingest::rows::{parse_inspection_row, ColumnIndex, InspectionRowDraft};
use pipecheck_core::ingest::RowError;
use pipecheck_db::models::defect::NewDefect;
use pipecheck_db::models::inspection::NewInspection;
use pipecheck_db::repositories::{AssetRepo, DefectRepo, InspectionRepo};
use pipecheck_db::DbPool;
use pipecheck_ml::{InspectionSample, LabeledSample};
use tracing::info;

use super::{row_number, ImportOutcome};
use crate::error::AppResult;

/// One import batch, committed, with the classifier inputs derived
/// from the freshly created inspections.
#[derive(Debug)]
pub struct InspectionImportResult {
    pub outcome: ImportOutcome,
    /// Rows carrying a ground-truth criticality label.
    pub labeled: Vec<LabeledSample>,
    /// Rows without a label, candidates for prediction.
    pub unlabeled: Vec<InspectionSample>,
}

fn to_sample(inspection_id: i64, draft: &InspectionRowDraft) -> InspectionSample {
    InspectionSample {
        inspection_id,
        method: draft.method.as_str().to_string(),
        temperature: draft.temperature,
        humidity: draft.humidity,
        illumination: draft.illumination,
        quality_grade: draft.quality_grade.map(|g| g.as_str().to_string()),
        defect_found: draft.defect_found,
        max_depth: draft.depth,
        max_length: draft.length,
        max_width: draft.width,
    }
}

/// Import an inspection dataset in one transaction.
///
/// All inspections are inserted first (flush, RETURNING ids), then the
/// defect rows referencing them. Rows referencing unknown assets fail
/// row validation; any persistence failure rolls the whole batch back.
pub async fn import_inspections(
    pool: &DbPool,
    dataset: &Dataset,
) -> AppResult<InspectionImportResult> {
    let index = ColumnIndex::new(dataset);
    let mut tx = pool.begin().await?;

    // Bulk existence pre-check over the referenced asset ids.
    let referenced: Vec<i64> = {
        let mut seen = HashSet::new();
        dataset
            .rows
            .iter()
            .filter_map(|row| {
                parse_id_opt(index.cell(row, "asset_id"), "asset_id")
                    .ok()
                    .flatten()
            })
            .filter(|id| seen.insert(*id))
            .collect()
    };
    let known_assets: HashSet<i64> = if referenced.is_empty() {
        HashSet::new()
    } else {
        AssetRepo::existing_ids_tx(&mut tx, &referenced)
            .await?
            .into_iter()
            .collect()
    };

    let mut outcome = ImportOutcome::default();
    let mut inserted: Vec<(i64, InspectionRowDraft)> = Vec::new();

    // Flush the inspections first; defects reference the returned ids.
    for (i, row) in dataset.rows.iter().enumerate() {
        let draft = match parse_inspection_row(&index, row) {
            Ok(draft) => draft,
            Err(error) => {
                outcome.errors.push(RowError {
                    row: row_number(i),
                    error,
                });
                continue;
            }
        };

        if !known_assets.contains(&draft.asset_id) {
            outcome.errors.push(RowError {
                row: row_number(i),
                error: format!("asset with id {} does not exist", draft.asset_id),
            });
            continue;
        }

        let inspection_id = InspectionRepo::insert_tx(
            &mut tx,
            &NewInspection {
                asset_id: draft.asset_id,
                inspected_at: draft.inspected_at,
                method: draft.method.as_str().to_string(),
                temperature: draft.temperature,
                humidity: draft.humidity,
                illumination: draft.illumination,
                quality_grade: draft.quality_grade.map(|g| g.as_str().to_string()),
                criticality_label: draft.criticality_label.map(|l| l.as_str().to_string()),
            },
        )
        .await?;
        outcome.created += 1;
        inserted.push((inspection_id, draft));
    }

    for (inspection_id, draft) in &inserted {
        if draft.defect_found {
            DefectRepo::insert_tx(
                &mut tx,
                &NewDefect {
                    inspection_id: *inspection_id,
                    defect_type: draft.defect_type.clone(),
                    depth: draft.depth,
                    length: draft.length,
                    width: draft.width,
                },
            )
            .await?;
            outcome.defects_created += 1;
        }
    }

    tx.commit().await?;
    info!(
        created = outcome.created,
        defects = outcome.defects_created,
        errors = outcome.errors.len(),
        "inspection import committed"
    );

    let mut labeled = Vec::new();
    let mut unlabeled = Vec::new();
    for (inspection_id, draft) in &inserted {
        let sample = to_sample(*inspection_id, draft);
        match draft.criticality_label {
            Some(label) => labeled.push(LabeledSample {
                sample,
                label: label.as_str().to_string(),
            }),
            None => unlabeled.push(sample),
        }
    }

    Ok(InspectionImportResult {
        outcome,
        labeled,
        unlabeled,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pipecheck_core::domain::{InspectionMethod, QualityGrade};

    use super::*;

    fn draft(defect_found: bool) -> InspectionRowDraft {
        InspectionRowDraft {
            asset_id: 7,
            inspected_at: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            method: InspectionMethod::Uzk,
            temperature: Some(18.5),
            humidity: None,
            illumination: None,
            quality_grade: Some(QualityGrade::Acceptable),
            criticality_label: None,
            defect_found,
            defect_type: Some("crack".to_string()),
            depth: Some(1.2),
            length: Some(40.0),
            width: None,
        }
    }

    #[test]
    fn sample_carries_defect_dims_and_flag() {
        let sample = to_sample(42, &draft(true));
        assert_eq!(sample.inspection_id, 42);
        assert_eq!(sample.method, "UZK");
        assert_eq!(sample.quality_grade.as_deref(), Some("acceptable"));
        assert!(sample.defect_found);
        assert_eq!(sample.max_depth, Some(1.2));
        assert_eq!(sample.max_width, None);
    }

    #[test]
    fn sample_without_defect_keeps_dims_from_row() {
        // Dimensions travel with the row even when no defect row will
        // be created for it.
        let sample = to_sample(1, &draft(false));
        assert!(!sample.defect_found);
        assert_eq!(sample.max_length, Some(40.0));
    }
}
