//! Per-row parsing of decoded datasets into validated drafts.
//!
//! The importers in the API layer own all database work; everything here
//! is pure. A draft either parses completely or fails with the first
//! field error, which the importer records against the row number.

use std::collections::HashMap;

use super::decode::{CellValue, Dataset};
use super::normalize::{
    normalize_asset_type, normalize_label, normalize_method, normalize_quality_grade, parse_bool,
    parse_float, parse_float_opt, parse_id_opt, parse_int_opt, parse_required_datetime,
    parse_text_opt, OnUnknown,
};
use crate::domain::{AssetType, CriticalityLabel, InspectionMethod, QualityGrade};
use crate::types::{DbId, Timestamp};

/// Case- and whitespace-insensitive column lookup, built once per
/// dataset.
#[derive(Debug)]
pub struct ColumnIndex {
    by_name: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new(dataset: &Dataset) -> Self {
        let by_name = dataset
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.trim().to_lowercase(), i))
            .collect();
        Self { by_name }
    }

    /// The cell for `column` in `row`, or a blank when the column is
    /// absent from the file.
    pub fn cell<'a>(&self, row: &'a [CellValue], column: &str) -> &'a CellValue {
        self.by_name
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or(&CellValue::Blank)
    }
}

/// A validated asset row, ready for upsert.
///
/// `asset_type` stays optional: update rows merge only the fields they
/// provide, and the create path enforces its presence.
#[derive(Debug, Clone)]
pub struct AssetRowDraft {
    pub asset_id: Option<DbId>,
    pub name: String,
    pub asset_type: Option<AssetType>,
    pub pipeline_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub install_year: Option<i32>,
    pub material: Option<String>,
}

/// A validated inspection row with its optional nested defect fields.
#[derive(Debug, Clone)]
pub struct InspectionRowDraft {
    pub asset_id: DbId,
    pub inspected_at: Timestamp,
    pub method: InspectionMethod,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub quality_grade: Option<QualityGrade>,
    pub criticality_label: Option<CriticalityLabel>,
    pub defect_found: bool,
    pub defect_type: Option<String>,
    pub depth: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
}

/// Parse one asset row. Name and numeric coordinates are required;
/// everything else is optional.
pub fn parse_asset_row(index: &ColumnIndex, row: &[CellValue]) -> Result<AssetRowDraft, String> {
    let name = parse_text_opt(index.cell(row, "object_name"))
        .ok_or_else(|| "object_name is required".to_string())?;

    Ok(AssetRowDraft {
        asset_id: parse_id_opt(index.cell(row, "asset_id"), "asset_id")?,
        name,
        asset_type: normalize_asset_type(index.cell(row, "object_type"))?,
        pipeline_id: parse_text_opt(index.cell(row, "pipeline_id")),
        latitude: parse_float(index.cell(row, "latitude"), "latitude")?,
        longitude: parse_float(index.cell(row, "longitude"), "longitude")?,
        install_year: parse_int_opt(index.cell(row, "year"), "year")?,
        material: parse_text_opt(index.cell(row, "material")),
    })
}

/// Parse one inspection row. The asset reference, method and date are
/// required; referential existence of the asset is checked by the
/// importer against its bulk pre-check, not here.
pub fn parse_inspection_row(
    index: &ColumnIndex,
    row: &[CellValue],
) -> Result<InspectionRowDraft, String> {
    let asset_id = parse_id_opt(index.cell(row, "asset_id"), "asset_id")?
        .ok_or_else(|| "asset_id is required".to_string())?;

    Ok(InspectionRowDraft {
        asset_id,
        inspected_at: parse_required_datetime(index.cell(row, "date"))?,
        method: normalize_method(index.cell(row, "method"))?,
        temperature: parse_float_opt(index.cell(row, "temperature"), "temperature")?,
        humidity: parse_float_opt(index.cell(row, "humidity"), "humidity")?,
        illumination: parse_float_opt(index.cell(row, "illumination"), "illumination")?,
        quality_grade: normalize_quality_grade(index.cell(row, "quality_grade"), OnUnknown::Fail)?,
        criticality_label: normalize_label(index.cell(row, "criticality_label"), OnUnknown::Fail)?,
        defect_found: parse_bool(index.cell(row, "defect_found"))?.unwrap_or(false),
        defect_type: parse_text_opt(index.cell(row, "defect_type")),
        depth: parse_float_opt(index.cell(row, "depth"), "depth")?,
        length: parse_float_opt(index.cell(row, "length"), "length")?,
        width: parse_float_opt(index.cell(row, "width"), "width")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::decode::decode_upload;

    fn dataset(content: &str) -> Dataset {
        decode_upload(content.as_bytes(), "test.csv").unwrap()
    }

    // -- asset rows --

    #[test]
    fn asset_row_full() {
        let ds = dataset(
            "asset_id,object_name,object_type,pipeline_id,latitude,longitude,year,material\n\
             1,Pump A,crane,PL-1,10,20,2005,steel\n",
        );
        let index = ColumnIndex::new(&ds);
        let draft = parse_asset_row(&index, &ds.rows[0]).unwrap();

        assert_eq!(draft.asset_id, Some(1));
        assert_eq!(draft.name, "Pump A");
        assert_eq!(draft.asset_type, Some(AssetType::Crane));
        assert_eq!(draft.pipeline_id.as_deref(), Some("PL-1"));
        assert_eq!(draft.latitude, 10.0);
        assert_eq!(draft.longitude, 20.0);
        assert_eq!(draft.install_year, Some(2005));
        assert_eq!(draft.material.as_deref(), Some("steel"));
    }

    #[test]
    fn asset_row_without_type_parses() {
        // Update rows merge provided fields only; a missing type is not
        // a row error at parse time.
        let ds = dataset("asset_id,object_name,latitude,longitude\n1,A2,10,20\n");
        let index = ColumnIndex::new(&ds);
        let draft = parse_asset_row(&index, &ds.rows[0]).unwrap();
        assert_eq!(draft.asset_type, None);
        assert_eq!(draft.name, "A2");
    }

    #[test]
    fn asset_row_requires_name_and_coordinates() {
        let ds = dataset(
            "asset_id,object_name,latitude,longitude\n1,,10,20\n2,B,,20\n3,C,10,\n",
        );
        let index = ColumnIndex::new(&ds);
        assert!(parse_asset_row(&index, &ds.rows[0])
            .unwrap_err()
            .contains("object_name"));
        assert!(parse_asset_row(&index, &ds.rows[1])
            .unwrap_err()
            .contains("latitude"));
        assert!(parse_asset_row(&index, &ds.rows[2])
            .unwrap_err()
            .contains("longitude"));
    }

    #[test]
    fn asset_row_bad_type_is_an_error() {
        let ds = dataset("asset_id,object_name,object_type,latitude,longitude\n1,A,valve,10,20\n");
        let index = ColumnIndex::new(&ds);
        assert!(parse_asset_row(&index, &ds.rows[0]).is_err());
    }

    // -- inspection rows --

    #[test]
    fn inspection_row_with_defect_fields() {
        let ds = dataset(
            "asset_id,method,date,defect_found,defect_type,depth\n\
             1,UZK,2024-01-01,yes,corrosion,3.2\n",
        );
        let index = ColumnIndex::new(&ds);
        let draft = parse_inspection_row(&index, &ds.rows[0]).unwrap();

        assert_eq!(draft.asset_id, 1);
        assert_eq!(draft.method, InspectionMethod::Uzk);
        assert!(draft.defect_found);
        assert_eq!(draft.defect_type.as_deref(), Some("corrosion"));
        assert_eq!(draft.depth, Some(3.2));
    }

    #[test]
    fn inspection_row_blank_defect_found_defaults_false() {
        let ds = dataset("asset_id,method,date,defect_found\n1,VIK,2024-01-01,\n");
        let index = ColumnIndex::new(&ds);
        let draft = parse_inspection_row(&index, &ds.rows[0]).unwrap();
        assert!(!draft.defect_found);
    }

    #[test]
    fn inspection_row_requires_asset_method_date() {
        let ds = dataset(
            "asset_id,method,date\n,VIK,2024-01-01\n1,,2024-01-01\n1,VIK,\n",
        );
        let index = ColumnIndex::new(&ds);
        assert!(parse_inspection_row(&index, &ds.rows[0])
            .unwrap_err()
            .contains("asset_id"));
        assert!(parse_inspection_row(&index, &ds.rows[1])
            .unwrap_err()
            .contains("method"));
        assert!(parse_inspection_row(&index, &ds.rows[2])
            .unwrap_err()
            .contains("date"));
    }

    #[test]
    fn inspection_row_strict_label_policy() {
        let ds = dataset("asset_id,method,date,criticality_label\n1,VIK,2024-01-01,critical\n");
        let index = ColumnIndex::new(&ds);
        assert!(parse_inspection_row(&index, &ds.rows[0]).is_err());
    }

    #[test]
    fn inspection_row_with_ground_truth_label() {
        let ds = dataset("asset_id,method,date,criticality_label\n1,VIK,2024-01-01,high\n");
        let index = ColumnIndex::new(&ds);
        let draft = parse_inspection_row(&index, &ds.rows[0]).unwrap();
        assert_eq!(draft.criticality_label, Some(CriticalityLabel::High));
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let ds = dataset("Asset_ID,Object_Name,LATITUDE,Longitude\n1,A,10,20\n");
        let index = ColumnIndex::new(&ds);
        let draft = parse_asset_row(&index, &ds.rows[0]).unwrap();
        assert_eq!(draft.asset_id, Some(1));
    }
}
