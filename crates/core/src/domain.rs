//! Domain enums for inspected assets and diagnostic events.
//!
//! Every enum round-trips through its canonical string form (`as_str` /
//! `parse`), which is also how values are stored in the database (TEXT
//! columns). `parse` is case-insensitive; anything fuzzier (aliases,
//! underscore/space equivalence) lives in [`crate::ingest::normalize`].

use serde::{Deserialize, Serialize};

/// The kind of physical asset under inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetType {
    Crane,
    Compressor,
    PipelineSection,
}

impl AssetType {
    pub const ALL: &'static [AssetType] = &[
        AssetType::Crane,
        AssetType::Compressor,
        AssetType::PipelineSection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crane => "crane",
            Self::Compressor => "compressor",
            Self::PipelineSection => "pipeline_section",
        }
    }

    /// Case-insensitive match against the canonical names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == value)
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic method codes (11 canonical variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionMethod {
    /// Visual inspection.
    Vik,
    /// Penetrant testing.
    Pvk,
    /// Magnetic particle testing.
    Mpk,
    /// Ultrasonic testing.
    Uzk,
    /// Radiographic testing.
    Rgk,
    /// Thermal imaging.
    Tvk,
    /// Vibration diagnostics.
    Vibro,
    /// Magnetic flux leakage.
    Mfl,
    /// Transient field inspection.
    Tfi,
    /// Geodetic survey.
    Geo,
    /// Ultrasonic thickness wall measurement.
    Utwm,
}

impl InspectionMethod {
    pub const ALL: &'static [InspectionMethod] = &[
        InspectionMethod::Vik,
        InspectionMethod::Pvk,
        InspectionMethod::Mpk,
        InspectionMethod::Uzk,
        InspectionMethod::Rgk,
        InspectionMethod::Tvk,
        InspectionMethod::Vibro,
        InspectionMethod::Mfl,
        InspectionMethod::Tfi,
        InspectionMethod::Geo,
        InspectionMethod::Utwm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vik => "VIK",
            Self::Pvk => "PVK",
            Self::Mpk => "MPK",
            Self::Uzk => "UZK",
            Self::Rgk => "RGK",
            Self::Tvk => "TVK",
            Self::Vibro => "VIBRO",
            Self::Mfl => "MFL",
            Self::Tfi => "TFI",
            Self::Geo => "GEO",
            Self::Utwm => "UTWM",
        }
    }

    /// Case-insensitive match against the canonical codes.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_uppercase();
        Self::ALL.iter().copied().find(|m| m.as_str() == value)
    }
}

impl std::fmt::Display for InspectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four-level ordered human judgment of an inspection outcome.
///
/// Ordered best-to-worst; independent of the ML criticality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityGrade {
    Satisfactory,
    Acceptable,
    RequiresAction,
    Unacceptable,
}

impl QualityGrade {
    pub const ALL: &'static [QualityGrade] = &[
        QualityGrade::Satisfactory,
        QualityGrade::Acceptable,
        QualityGrade::RequiresAction,
        QualityGrade::Unacceptable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfactory => "satisfactory",
            Self::Acceptable => "acceptable",
            Self::RequiresAction => "requires_action",
            Self::Unacceptable => "unacceptable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.iter().copied().find(|g| g.as_str() == value)
    }
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-level criticality classification predicted by the model (or
/// supplied as ground truth in an upload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalityLabel {
    Normal,
    Medium,
    High,
}

impl CriticalityLabel {
    pub const ALL: &'static [CriticalityLabel] = &[
        CriticalityLabel::Normal,
        CriticalityLabel::Medium,
        CriticalityLabel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.iter().copied().find(|l| l.as_str() == value)
    }
}

impl std::fmt::Display for CriticalityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_type_round_trip() {
        for t in AssetType::ALL {
            assert_eq!(AssetType::parse(t.as_str()), Some(*t));
        }
    }

    #[test]
    fn asset_type_case_insensitive() {
        assert_eq!(AssetType::parse("CRANE"), Some(AssetType::Crane));
        assert_eq!(
            AssetType::parse("Pipeline_Section"),
            Some(AssetType::PipelineSection)
        );
    }

    #[test]
    fn method_has_eleven_variants() {
        assert_eq!(InspectionMethod::ALL.len(), 11);
    }

    #[test]
    fn method_round_trip() {
        for m in InspectionMethod::ALL {
            assert_eq!(InspectionMethod::parse(m.as_str()), Some(*m));
        }
    }

    #[test]
    fn method_case_insensitive() {
        assert_eq!(
            InspectionMethod::parse("uzk"),
            Some(InspectionMethod::Uzk)
        );
    }

    #[test]
    fn grade_ordering_best_to_worst() {
        assert!(QualityGrade::Satisfactory < QualityGrade::Acceptable);
        assert!(QualityGrade::RequiresAction < QualityGrade::Unacceptable);
    }

    #[test]
    fn label_round_trip() {
        for l in CriticalityLabel::ALL {
            assert_eq!(CriticalityLabel::parse(l.as_str()), Some(*l));
        }
    }

    #[test]
    fn unknown_values_rejected() {
        assert_eq!(AssetType::parse("valve"), None);
        assert_eq!(InspectionMethod::parse("XRAY"), None);
        assert_eq!(QualityGrade::parse("fine"), None);
        assert_eq!(CriticalityLabel::parse("critical"), None);
    }
}
