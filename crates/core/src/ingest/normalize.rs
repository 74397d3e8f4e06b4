//! Per-field conversion functions.
//!
//! Each function is total over its declared input domain and fails with a
//! human-readable message otherwise; those messages end up verbatim in
//! the per-row error list of an import response.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::decode::CellValue;
use crate::domain::{AssetType, CriticalityLabel, InspectionMethod, QualityGrade};
use crate::types::{DbId, Timestamp};

/// Policy for optional enum fields whose value is present but
/// unrecognized. Blank input always yields "no value" regardless of
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnUnknown {
    /// Report a row error.
    Fail,
    /// Silently fall back to "no value".
    None,
}

/// Shorthand method aliases accepted on input (uppercased form -> code).
const METHOD_ALIASES: &[(&str, InspectionMethod)] = &[
    ("UT", InspectionMethod::Uzk),
    ("ULTRASONIC", InspectionMethod::Uzk),
    ("УТ", InspectionMethod::Uzk),
    ("УЗК", InspectionMethod::Uzk),
];

/// Legacy quality grade spellings accepted on input (lowercased,
/// space-normalized form -> grade).
const GRADE_ALIASES: &[(&str, QualityGrade)] = &[
    ("удовлетворительно", QualityGrade::Satisfactory),
    ("допустимо", QualityGrade::Acceptable),
    ("требует_мер", QualityGrade::RequiresAction),
    ("недопустимо", QualityGrade::Unacceptable),
];

/// Normalize an asset type. Underscores and spaces are equivalent.
pub fn normalize_asset_type(cell: &CellValue) -> Result<Option<AssetType>, String> {
    let Some(text) = cell.as_text() else {
        return Ok(None);
    };
    let candidate = text.to_lowercase().replace(' ', "_");
    AssetType::parse(&candidate)
        .map(Some)
        .ok_or_else(|| format!("Unknown object_type '{text}'"))
}

/// Normalize a diagnostic method, accepting the alias table.
pub fn normalize_method(cell: &CellValue) -> Result<InspectionMethod, String> {
    let Some(text) = cell.as_text() else {
        return Err("method is required".to_string());
    };
    let upper = text.to_uppercase();
    if let Some((_, method)) = METHOD_ALIASES.iter().find(|(alias, _)| *alias == upper) {
        return Ok(*method);
    }
    InspectionMethod::parse(&upper).ok_or_else(|| format!("Unknown diagnostic method '{text}'"))
}

/// Normalize an optional quality grade under the given unknown-value
/// policy.
pub fn normalize_quality_grade(
    cell: &CellValue,
    on_unknown: OnUnknown,
) -> Result<Option<QualityGrade>, String> {
    let Some(text) = cell.as_text() else {
        return Ok(None);
    };
    let candidate = text.to_lowercase().replace(' ', "_");
    if let Some((_, grade)) = GRADE_ALIASES.iter().find(|(alias, _)| *alias == candidate) {
        return Ok(Some(*grade));
    }
    match QualityGrade::parse(&candidate) {
        Some(grade) => Ok(Some(grade)),
        None => match on_unknown {
            OnUnknown::Fail => Err(format!("Unknown quality grade '{text}'")),
            OnUnknown::None => Ok(None),
        },
    }
}

/// Normalize an optional criticality label under the given
/// unknown-value policy.
pub fn normalize_label(
    cell: &CellValue,
    on_unknown: OnUnknown,
) -> Result<Option<CriticalityLabel>, String> {
    let Some(text) = cell.as_text() else {
        return Ok(None);
    };
    match CriticalityLabel::parse(&text) {
        Some(label) => Ok(Some(label)),
        None => match on_unknown {
            OnUnknown::Fail => Err(format!("Unknown criticality label '{text}'")),
            OnUnknown::None => Ok(None),
        },
    }
}

/// Coerce a cell to a boolean. Blank yields "no value"; any other text
/// outside the recognized sets is an error.
pub fn parse_bool(cell: &CellValue) -> Result<Option<bool>, String> {
    let Some(text) = cell.as_text() else {
        return Ok(None);
    };
    match text.to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(Some(true)),
        "0" | "false" | "no" | "n" => Ok(Some(false)),
        _ => Err(format!("Cannot convert '{text}' to boolean")),
    }
}

/// Parse an optional float field.
pub fn parse_float_opt(cell: &CellValue, field: &str) -> Result<Option<f64>, String> {
    match cell {
        CellValue::Number(n) => Ok(Some(*n)),
        CellValue::Blank => Ok(None),
        CellValue::Text(_) => match cell.as_text() {
            None => Ok(None),
            Some(text) => text
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("Invalid number for {field}: '{text}'")),
        },
    }
}

/// Parse a required float field.
pub fn parse_float(cell: &CellValue, field: &str) -> Result<f64, String> {
    parse_float_opt(cell, field)?.ok_or_else(|| format!("{field} is required"))
}

/// Parse an optional integer field (whole-valued floats accepted).
pub fn parse_int_opt(cell: &CellValue, field: &str) -> Result<Option<i32>, String> {
    match parse_float_opt(cell, field)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(&n) => {
            Ok(Some(n as i32))
        }
        Some(n) => Err(format!("Invalid integer for {field}: '{n}'")),
    }
}

/// Parse an optional entity identifier.
pub fn parse_id_opt(cell: &CellValue, field: &str) -> Result<Option<DbId>, String> {
    match parse_float_opt(cell, field)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n >= 0.0 && n < 9e18 => Ok(Some(n as DbId)),
        Some(n) => Err(format!("Invalid identifier for {field}: '{n}'")),
    }
}

/// Parse a required calendar date or datetime.
///
/// Accepted forms: RFC 3339, `YYYY-MM-DD HH:MM:SS`, and `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_required_datetime(cell: &CellValue) -> Result<Timestamp, String> {
    let Some(text) = cell.as_text() else {
        return Err("date is required".to_string());
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()));
    }
    Err(format!("Invalid date '{text}'"))
}

/// Optional free-text field: trimmed, blank collapses to `None`.
pub fn parse_text_opt(cell: &CellValue) -> Option<String> {
    cell.as_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    // -- asset type --

    #[test]
    fn asset_type_underscores_and_spaces_equivalent() {
        assert_eq!(
            normalize_asset_type(&text("pipeline section")).unwrap(),
            Some(AssetType::PipelineSection)
        );
        assert_eq!(
            normalize_asset_type(&text("Pipeline_Section")).unwrap(),
            Some(AssetType::PipelineSection)
        );
    }

    #[test]
    fn asset_type_canonical_is_idempotent() {
        for t in AssetType::ALL {
            assert_eq!(normalize_asset_type(&text(t.as_str())).unwrap(), Some(*t));
        }
    }

    #[test]
    fn asset_type_blank_is_none() {
        assert_eq!(normalize_asset_type(&CellValue::Blank).unwrap(), None);
    }

    #[test]
    fn asset_type_unknown_fails() {
        assert!(normalize_asset_type(&text("valve")).is_err());
    }

    // -- method --

    #[test]
    fn method_accepts_aliases() {
        assert_eq!(normalize_method(&text("UT")).unwrap(), InspectionMethod::Uzk);
        assert_eq!(
            normalize_method(&text("ultrasonic")).unwrap(),
            InspectionMethod::Uzk
        );
        assert_eq!(normalize_method(&text("УЗК")).unwrap(), InspectionMethod::Uzk);
    }

    #[test]
    fn method_canonical_is_idempotent() {
        for m in InspectionMethod::ALL {
            assert_eq!(normalize_method(&text(m.as_str())).unwrap(), *m);
        }
    }

    #[test]
    fn method_required_and_strict() {
        assert!(normalize_method(&CellValue::Blank).is_err());
        assert!(normalize_method(&text("XRAY")).is_err());
    }

    // -- quality grade --

    #[test]
    fn grade_blank_is_none_under_both_policies() {
        assert_eq!(
            normalize_quality_grade(&CellValue::Blank, OnUnknown::Fail).unwrap(),
            None
        );
        assert_eq!(
            normalize_quality_grade(&CellValue::Blank, OnUnknown::None).unwrap(),
            None
        );
    }

    #[test]
    fn grade_accepts_legacy_spellings() {
        assert_eq!(
            normalize_quality_grade(&text("требует мер"), OnUnknown::Fail).unwrap(),
            Some(QualityGrade::RequiresAction)
        );
    }

    #[test]
    fn grade_unknown_policy_split() {
        assert!(normalize_quality_grade(&text("fine"), OnUnknown::Fail).is_err());
        assert_eq!(
            normalize_quality_grade(&text("fine"), OnUnknown::None).unwrap(),
            None
        );
    }

    // -- criticality label --

    #[test]
    fn label_unknown_policy_split() {
        assert!(normalize_label(&text("critical"), OnUnknown::Fail).is_err());
        assert_eq!(normalize_label(&text("critical"), OnUnknown::None).unwrap(), None);
        assert_eq!(
            normalize_label(&text("HIGH"), OnUnknown::Fail).unwrap(),
            Some(CriticalityLabel::High)
        );
    }

    // -- boolean --

    #[test]
    fn bool_recognized_sets() {
        for t in ["1", "true", "Yes", "y"] {
            assert_eq!(parse_bool(&text(t)).unwrap(), Some(true), "input: {t}");
        }
        for f in ["0", "false", "NO", "n"] {
            assert_eq!(parse_bool(&text(f)).unwrap(), Some(false), "input: {f}");
        }
    }

    #[test]
    fn bool_blank_is_none() {
        assert_eq!(parse_bool(&CellValue::Blank).unwrap(), None);
    }

    #[test]
    fn bool_other_text_fails() {
        assert!(parse_bool(&text("maybe")).is_err());
    }

    #[test]
    fn bool_numeric_cells_coerce() {
        assert_eq!(parse_bool(&CellValue::Number(1.0)).unwrap(), Some(true));
        assert_eq!(parse_bool(&CellValue::Number(0.0)).unwrap(), Some(false));
    }

    // -- numbers, ids, dates --

    #[test]
    fn float_text_and_number_cells() {
        assert_eq!(parse_float_opt(&text("3.2"), "depth").unwrap(), Some(3.2));
        assert_eq!(
            parse_float_opt(&CellValue::Number(1.5), "depth").unwrap(),
            Some(1.5)
        );
        assert_eq!(parse_float_opt(&CellValue::Blank, "depth").unwrap(), None);
        assert!(parse_float_opt(&text("deep"), "depth").is_err());
    }

    #[test]
    fn int_rejects_fractional() {
        assert_eq!(parse_int_opt(&text("2005"), "year").unwrap(), Some(2005));
        assert!(parse_int_opt(&CellValue::Number(2005.5), "year").is_err());
    }

    #[test]
    fn id_accepts_whole_numeric_cells() {
        // Spreadsheet decoders surface identifiers as floats.
        assert_eq!(
            parse_id_opt(&CellValue::Number(7.0), "asset_id").unwrap(),
            Some(7)
        );
        assert_eq!(parse_id_opt(&CellValue::Blank, "asset_id").unwrap(), None);
    }

    #[test]
    fn datetime_accepted_forms() {
        assert!(parse_required_datetime(&text("2024-01-01")).is_ok());
        assert!(parse_required_datetime(&text("2024-01-01 13:30:00")).is_ok());
        assert!(parse_required_datetime(&text("2024-01-01T13:30:00Z")).is_ok());
        assert!(parse_required_datetime(&text("January 1st")).is_err());
        assert!(parse_required_datetime(&CellValue::Blank).is_err());
    }
}
