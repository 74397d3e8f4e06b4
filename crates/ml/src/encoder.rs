//! Label encoding for categorical feature columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::MISSING_VALUE;

/// Maps category strings to dense indices. Fitted once; values not seen
/// at fit time encode to the missing-value sentinel instead of growing
/// the mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl CategoricalEncoder {
    /// Fit an encoder over the distinct values in `values`, sorted for
    /// a stable ordering.
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(str::to_owned).collect();
        classes.sort();
        classes.dedup();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { classes, index }
    }

    /// Rebuild the lookup index after deserialization.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
    }

    /// Index of a fitted class, if present.
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Encode an optional value as a feature: fitted classes map to
    /// their index, everything else to the sentinel.
    pub fn encode_feature(&self, value: Option<&str>) -> f32 {
        value
            .and_then(|v| self.transform(v))
            .map_or(MISSING_VALUE, |i| i as f32)
    }

    /// Class string for a dense index.
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// The fitted classes, in index order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of fitted classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Whether every value in `values` is already a fitted class.
    pub fn covers<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        values.into_iter().all(|v| self.index.contains_key(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_sorts_and_dedups() {
        let enc = CategoricalEncoder::fit(["UZK", "VIK", "UZK", "MPK"]);
        assert_eq!(enc.classes(), &["MPK", "UZK", "VIK"]);
        assert_eq!(enc.transform("UZK"), Some(1));
        assert_eq!(enc.inverse(2), Some("VIK"));
    }

    #[test]
    fn unseen_and_missing_encode_to_sentinel() {
        let enc = CategoricalEncoder::fit(["VIK"]);
        assert_eq!(enc.encode_feature(Some("VIK")), 0.0);
        assert_eq!(enc.encode_feature(Some("RGK")), MISSING_VALUE);
        assert_eq!(enc.encode_feature(None), MISSING_VALUE);
    }

    #[test]
    fn covers_checks_membership() {
        let enc = CategoricalEncoder::fit(["high", "normal"]);
        assert!(enc.covers(["normal", "high"]));
        assert!(!enc.covers(["normal", "medium"]));
    }

    #[test]
    fn roundtrips_through_json() {
        let enc = CategoricalEncoder::fit(["a", "b"]);
        let json = serde_json::to_string(&enc).unwrap();
        let mut back: CategoricalEncoder = serde_json::from_str(&json).unwrap();
        back.rebuild_index();
        assert_eq!(back.transform("b"), Some(1));
    }
}
