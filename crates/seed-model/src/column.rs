//! Raw columns of an uploaded file and their proposed mapping (TCM records).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::confidence::{ConfidenceLevel, ConfidenceThresholds};
use crate::schema::FieldType;

/// Row-level validity of a column's sample values against its target type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    /// No target field selected, nothing validated.
    #[default]
    Unset,
    Valid,
    Semivalid,
    Invalid,
}

impl Validity {
    /// Validity from the number of failing samples out of all samples.
    ///
    /// No samples at all counts as valid.
    pub fn from_counts(invalid: usize, samples: usize) -> Self {
        if invalid == 0 {
            Self::Valid
        } else if invalid >= samples {
            Self::Invalid
        } else {
            Self::Semivalid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Valid => "valid",
            Self::Semivalid => "semivalid",
            Self::Invalid => "invalid",
        }
    }
}

/// One raw column header of an uploaded file paired with its proposed
/// canonical field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    /// Header as it appears in the file.
    pub name: String,
    /// 1-based position of the header in the file.
    pub row_index: usize,
    /// Example values taken from the first data rows.
    pub sample_values: Vec<String>,
    /// Target canonical field; `None` means the column is ignored.
    pub suggestion: Option<String>,
    /// Suggestion confidence on the 0-100 scale.
    pub confidence: Option<f64>,
    pub suggestion_type: Option<FieldType>,
    pub invalid_samples: Vec<String>,
    pub validity: Validity,
    pub is_duplicate: bool,
    /// Set once the operator picked the target by hand.
    pub user_suggestion: bool,
    /// Target lives in the free-form extra-data namespace.
    pub is_extra_data: bool,
    /// Column is an input of a concatenated column and is not mapped itself.
    pub is_concat_parameter: bool,
    pub is_concatenated: bool,
    /// Headers merged into this column, only when `is_concatenated`.
    pub source_headers: Vec<String>,
    /// `row_index` of each merged column, parallel to `source_headers`.
    pub source_rows: Vec<usize>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, row_index: usize, sample_values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            row_index,
            sample_values,
            ..Self::default()
        }
    }

    /// Non-empty target field, if any.
    pub fn target(&self) -> Option<&str> {
        self.suggestion.as_deref().filter(|s| !s.is_empty())
    }

    pub fn confidence_level(&self, thresholds: &ConfidenceThresholds) -> Option<ConfidenceLevel> {
        self.confidence.map(|c| thresholds.categorize(c))
    }

    /// Whether a sample cell is one of the failing values.
    pub fn is_invalid_sample(&self, value: &str) -> bool {
        self.invalid_samples.iter().any(|v| v == value)
    }
}

/// A previously suggested target for a header: `[field, confidence]` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct PriorSuggestion {
    /// Canonical field, empty when no match cleared the threshold.
    pub field: String,
    pub confidence: f64,
}

impl PriorSuggestion {
    pub fn new(field: impl Into<String>, confidence: f64) -> Self {
        Self {
            field: field.into(),
            confidence,
        }
    }
}

impl From<(String, f64)> for PriorSuggestion {
    fn from((field, confidence): (String, f64)) -> Self {
        Self { field, confidence }
    }
}

impl From<PriorSuggestion> for (String, f64) {
    fn from(value: PriorSuggestion) -> Self {
        (value.field, value.confidence)
    }
}

/// Header to prior suggestion.
pub type SuggestionTable = BTreeMap<String, PriorSuggestion>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_from_counts() {
        assert_eq!(Validity::from_counts(0, 0), Validity::Valid);
        assert_eq!(Validity::from_counts(0, 4), Validity::Valid);
        assert_eq!(Validity::from_counts(1, 4), Validity::Semivalid);
        assert_eq!(Validity::from_counts(3, 4), Validity::Semivalid);
        assert_eq!(Validity::from_counts(4, 4), Validity::Invalid);
    }

    #[test]
    fn prior_suggestion_is_a_pair_on_the_wire() {
        let table: SuggestionTable =
            serde_json::from_str(r#"{"GFA": ["gross_floor_area", 88.0]}"#).expect("parse");
        assert_eq!(table["GFA"], PriorSuggestion::new("gross_floor_area", 88.0));
        let json = serde_json::to_string(&table).expect("serialize");
        assert_eq!(json, r#"{"GFA":["gross_floor_area",88.0]}"#);
    }
}
