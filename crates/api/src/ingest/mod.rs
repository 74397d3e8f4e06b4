//! Importers: the database-side half of the upload pipeline.
//!
//! Row parsing lives in `pipecheck_core::ingest`; these modules own the
//! batch transactions and the created/updated/error accounting.

pub mod assets;
pub mod inspections;

use pipecheck_core::ingest::RowError;

/// Counters accumulated over one import batch.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub created: i32,
    pub updated: i32,
    pub defects_created: i32,
    pub errors: Vec<RowError>,
}

/// Spreadsheet-style row number for data row `i` (0-based): row 1 is
/// the header, so the first data row is 2.
pub(crate) fn row_number(i: usize) -> usize {
    i + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_data_row_is_numbered_two() {
        assert_eq!(row_number(0), 2);
        assert_eq!(row_number(9), 11);
    }
}
