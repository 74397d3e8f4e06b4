/// Domain-level error type shared across the workspace.
///
/// These are the batch-fatal format errors of the upload pipeline
/// (oversized file, undecodable content, unrecognized column set).
/// Row-scoped validation failures are NOT represented here -- they are
/// collected per row as [`crate::ingest::RowError`] and never abort an
/// import.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Cannot parse file: {0}")]
    Parse(String),

    #[error("Unknown file format: column set matches neither assets nor inspections")]
    UnknownSchema,
}
