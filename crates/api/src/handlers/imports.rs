//! Handlers for flat-file upload and import history.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pipecheck_core::ingest::decode::decode_upload;
use pipecheck_core::ingest::{detect_file_type, DetectedFileType, RowError};
use pipecheck_core::types::DbId;
use pipecheck_db::models::import_record::{CreateImportRecord, ImportRecord};
use pipecheck_db::repositories::ImportRecordRepo;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::ingest::{assets, inspections, ImportOutcome};
use crate::ml_service;
use crate::response::DataResponse;
use crate::state::AppState;

/// Typed response for the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub import_id: DbId,
    pub filename: String,
    pub file_type: DetectedFileType,
    pub columns: Vec<String>,
    pub preview: Vec<serde_json::Value>,
    pub created: i32,
    pub updated: i32,
    pub defects_created: i32,
    pub errors: Vec<RowError>,
}

/// POST /api/v1/imports/upload
///
/// Accept one multipart file (field `file`), decode it, detect whether
/// it carries assets or inspections, and run the matching importer.
/// The import history row is written after the batch commits.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResult>>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let Some((filename, content)) = upload else {
        return Err(AppError::BadRequest(
            "Multipart field 'file' is required".to_string(),
        ));
    };
    // decode_upload enforces MAX_UPLOAD_BYTES before parsing anything.
    let dataset = decode_upload(&content, &filename)?;
    let file_type = detect_file_type(&dataset.columns)?;

    let outcome: ImportOutcome = match file_type {
        DetectedFileType::Assets => assets::import_assets(&state.pool, &dataset).await?,
        DetectedFileType::Inspections => {
            let result = inspections::import_inspections(&state.pool, &dataset).await?;
            // The batch is committed; classifier work is best-effort.
            if !result.labeled.is_empty() {
                if let Err(e) =
                    ml_service::run_after_import(&state, result.labeled, result.unlabeled).await
                {
                    warn!(error = %e, "ML phase failed after inspection import");
                }
            }
            result.outcome
        }
    };

    let record = ImportRecordRepo::create(
        &state.pool,
        &CreateImportRecord {
            filename: filename.clone(),
            file_type: file_type.as_str().to_string(),
            file_size: Some(content.len() as i64),
            created: outcome.created,
            updated: outcome.updated,
            defects_created: outcome.defects_created,
            error_count: outcome.errors.len() as i32,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResult {
                import_id: record.id,
                filename,
                file_type,
                columns: dataset.columns.clone(),
                preview: dataset.preview(),
                created: outcome.created,
                updated: outcome.updated,
                defects_created: outcome.defects_created,
                errors: outcome.errors,
            },
        }),
    ))
}

/// Query parameters for the history listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/imports -- import history, newest first.
pub async fn list_imports(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<ImportRecord>>>> {
    let records = ImportRecordRepo::list(&state.pool, params.limit, params.offset).await?;
    Ok(Json(DataResponse { data: records }))
}
