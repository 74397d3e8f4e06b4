//! Pure logic for the flat-file import pipeline.
//!
//! Control flow (all pure, invoked by the API-layer importers):
//! decode ([`decode::decode_upload`]) -> schema detection
//! ([`detect_file_type`]) -> per-row parsing ([`rows`]) built on the
//! field normalizers ([`normalize`]).

pub mod decode;
pub mod normalize;
pub mod rows;

use serde::Serialize;

use crate::error::CoreError;

/// Upload size ceiling, enforced before any parsing is attempted.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Number of data rows included in the upload response preview.
pub const PREVIEW_ROWS: usize = 5;

/// Columns an asset file must provide.
pub const ASSET_REQUIRED_COLUMNS: &[&str] = &["asset_id", "latitude", "longitude"];

/// Column sets that identify an inspection file (either one suffices).
pub const INSPECTION_COLUMN_SETS: &[&[&str]] = &[
    &["inspection_id", "method"],
    &["asset_id", "method", "date"],
];

/// The logical entity type a file encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedFileType {
    Assets,
    Inspections,
}

impl DetectedFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assets => "assets",
            Self::Inspections => "inspections",
        }
    }
}

impl std::fmt::Display for DetectedFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row-scoped validation failure.
///
/// `row` is 1-based and offset by the header row, so the first data row
/// is row 2 -- matching what a user sees in a spreadsheet editor.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Decide which logical entity type the column set encodes.
///
/// Membership is case- and whitespace-insensitive. Asset detection wins
/// over inspection detection when both sets are present.
pub fn detect_file_type(columns: &[String]) -> Result<DetectedFileType, CoreError> {
    let normalized: Vec<String> = columns
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    let contains_all =
        |required: &[&str]| required.iter().all(|r| normalized.iter().any(|c| c == r));

    if contains_all(ASSET_REQUIRED_COLUMNS) {
        return Ok(DetectedFileType::Assets);
    }
    if INSPECTION_COLUMN_SETS.iter().any(|set| contains_all(set)) {
        return Ok(DetectedFileType::Inspections);
    }
    Err(CoreError::UnknownSchema)
}
