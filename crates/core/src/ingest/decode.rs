//! Tabular decoder: uploaded bytes + filename -> ordered dataset.
//!
//! Two serializations are supported, chosen by file extension:
//! comma-delimited text (anything that is not a spreadsheet) and
//! spreadsheet binary (`.xlsx` / `.xls`). Cell values stay weakly typed
//! ([`CellValue`]) until the normalizers consume them.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{json, Value};

use super::{MAX_UPLOAD_BYTES, PREVIEW_ROWS};
use crate::error::CoreError;

/// A raw cell value as produced by the decoder.
///
/// Kept deliberately small: text, number, or nothing. Downstream
/// normalizers match exhaustively on these three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

impl CellValue {
    /// Trimmed textual form of the cell, or `None` when the cell is
    /// blank (including whitespace-only text).
    ///
    /// Whole numbers are rendered without a fractional part so that an
    /// Excel `1` and a CSV `"1"` normalize identically.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            Self::Blank => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none()
    }

    /// JSON-safe rendering: blanks become null.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => json!(s),
            Self::Number(n) => json!(n),
            Self::Blank => Value::Null,
        }
    }
}

/// An ordered, weakly typed dataset: one header row plus data rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// JSON-safe preview of the first [`PREVIEW_ROWS`] data rows, one
    /// object per row keyed by column name.
    pub fn preview(&self) -> Vec<Value> {
        self.rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                let entries: serde_json::Map<String, Value> = self
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let cell = row.get(i).unwrap_or(&CellValue::Blank);
                        (col.clone(), cell.to_json())
                    })
                    .collect();
                Value::Object(entries)
            })
            .collect()
    }
}

/// Decode uploaded bytes into a [`Dataset`].
///
/// The size ceiling is enforced before parsing is attempted, so an
/// oversized upload fails with [`CoreError::TooLarge`] rather than a
/// parse error. Undecodable content fails with [`CoreError::Parse`]
/// carrying the underlying cause.
pub fn decode_upload(content: &[u8], filename: &str) -> Result<Dataset, CoreError> {
    if content.len() > MAX_UPLOAD_BYTES {
        return Err(CoreError::TooLarge {
            size: content.len(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    let lower = filename.to_lowercase();
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        decode_spreadsheet(content)
    } else {
        decode_csv(content)
    }
}

fn decode_csv(content: &[u8]) -> Result<Dataset, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(content));

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CoreError::Parse(e.to_string()))?;
        let mut row: Vec<CellValue> = record
            .iter()
            .take(columns.len())
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Blank
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        // Short rows are padded so every row matches the header width.
        row.resize(columns.len(), CellValue::Blank);
        rows.push(row);
    }

    Ok(Dataset { columns, rows })
}

fn decode_spreadsheet(content: &[u8]) -> Result<Dataset, CoreError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))
        .map_err(|e| CoreError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CoreError::Parse("workbook has no sheets".to_string()))?
        .map_err(|e| CoreError::Parse(e.to_string()))?;

    let mut iter = range.rows();
    let header = iter
        .next()
        .ok_or_else(|| CoreError::Parse("sheet has no header row".to_string()))?;
    let columns: Vec<String> = header
        .iter()
        .map(|c| match c {
            Data::String(s) => s.trim().to_string(),
            other => other.to_string().trim().to_string(),
        })
        .collect();

    let rows = iter
        .map(|row| {
            let mut cells: Vec<CellValue> = row
                .iter()
                .take(columns.len())
                .map(convert_spreadsheet_cell)
                .collect();
            cells.resize(columns.len(), CellValue::Blank);
            cells
        })
        .collect();

    Ok(Dataset { columns, rows })
}

fn convert_spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Blank
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Text(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Empty | Data::Error(_) => CellValue::Blank,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn decodes_csv_with_blanks() {
        let content = b"asset_id,object_name,latitude\n1,Pump station,55.7\n2,,\n";
        let dataset = decode_upload(content, "assets.csv").unwrap();

        assert_eq!(dataset.columns, vec!["asset_id", "object_name", "latitude"]);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0][1], CellValue::Text("Pump station".to_string()));
        assert_eq!(dataset.rows[1][1], CellValue::Blank);
        assert_eq!(dataset.rows[1][2], CellValue::Blank);
    }

    #[test]
    fn short_csv_rows_are_padded() {
        let content = b"a,b,c\n1\n";
        let dataset = decode_upload(content, "x.csv").unwrap();
        assert_eq!(dataset.rows[0].len(), 3);
        assert_eq!(dataset.rows[0][2], CellValue::Blank);
    }

    #[test]
    fn oversized_upload_fails_before_parsing() {
        let content = vec![b'a'; MAX_UPLOAD_BYTES + 1];
        assert_matches!(
            decode_upload(&content, "big.csv"),
            Err(CoreError::TooLarge { .. })
        );
    }

    #[test]
    fn corrupt_spreadsheet_is_a_parse_error() {
        let content = b"definitely not a workbook";
        assert_matches!(
            decode_upload(content, "data.xlsx"),
            Err(CoreError::Parse(_))
        );
    }

    #[test]
    fn preview_renders_blanks_as_null() {
        let content = b"asset_id,material\n1,steel\n2,\n";
        let dataset = decode_upload(content, "assets.csv").unwrap();
        let preview = dataset.preview();

        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0]["material"], serde_json::json!("steel"));
        assert!(preview[1]["material"].is_null());
    }

    #[test]
    fn preview_is_capped_at_five_rows() {
        let mut content = String::from("a\n");
        for i in 0..10 {
            content.push_str(&format!("{i}\n"));
        }
        let dataset = decode_upload(content.as_bytes(), "x.csv").unwrap();
        assert_eq!(dataset.preview().len(), 5);
    }

    #[test]
    fn numeric_cells_render_whole_numbers_without_fraction() {
        assert_eq!(CellValue::Number(1.0).as_text().as_deref(), Some("1"));
        assert_eq!(CellValue::Number(3.2).as_text().as_deref(), Some("3.2"));
    }

    #[test]
    fn whitespace_only_text_is_blank() {
        assert!(CellValue::Text("   ".to_string()).is_blank());
        assert!(CellValue::Blank.is_blank());
        assert!(!CellValue::Text("x".to_string()).is_blank());
    }
}
