//! Fuzzy matching and scoring for header-to-field suggestions.
//!
//! Uses Jaro-Winkler similarity as the base algorithm with a type-agreement
//! adjustment from the column's sample values. A header the organization
//! mapped before always wins with full confidence.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rapidfuzz::distance::jaro_winkler;
use seed_model::{FieldSchema, FieldType, PriorSuggestion, RawColumn, SuggestionTable};

use crate::utils::normalize_text;
use crate::validate::converts;

/// Default acceptance threshold on the 0-100 scale.
pub const DEFAULT_THRESHOLD: f64 = 20.0;

const TYPE_AGREEMENT_BOOST: f64 = 1.10;
const TYPE_MISMATCH_PENALTY: f64 = 0.85;

/// Score for a single header-field pair.
#[derive(Debug, Clone)]
pub struct ColumnScore {
    /// Final confidence on the 0-100 scale.
    pub score: f64,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl ColumnScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        self.explanation
            .iter()
            .map(|c| format!("{}: {:.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone)]
pub struct ScoreComponent {
    /// Component name (e.g., "Name similarity").
    pub name: &'static str,
    /// Component value (negative for penalties).
    pub value: f64,
    pub description: String,
}

/// Best field found for a header.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub header: String,
    /// `None` when no field cleared the threshold.
    pub field: Option<String>,
    pub score: ColumnScore,
}

/// Engine for scoring raw headers against the canonical schema.
///
/// Each header gets its own best field. Two headers may well end up on the
/// same field; that is left for the conflict detector to surface.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    schema: FieldSchema,
    previous: BTreeMap<String, String>,
    threshold: f64,
}

impl ScoringEngine {
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            previous: BTreeMap::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Header to field mappings the organization saved before.
    pub fn with_previous(mut self, previous: BTreeMap<String, String>) -> Self {
        self.previous = previous;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score a header against one field.
    ///
    /// Returns `None` if the field is not part of the schema.
    pub fn score(&self, header: &str, samples: &[String], field: &str) -> Option<ColumnScore> {
        if !self.schema.contains(field) {
            return None;
        }
        Some(self.compute_score(header, samples, field))
    }

    /// Best field for a header, previous mappings first.
    pub fn best_match(&self, header: &str, samples: &[String]) -> Suggestion {
        if let Some(field) = self.previous.get(header) {
            return Suggestion {
                header: header.to_string(),
                field: Some(field.clone()),
                score: ColumnScore {
                    score: 100.0,
                    explanation: vec![ScoreComponent {
                        name: "Previous mapping",
                        value: 1.0,
                        description: format!("'{header}' was mapped to '{field}' before"),
                    }],
                },
            };
        }

        let best = self
            .schema
            .fields
            .iter()
            .map(|field| (field, self.compute_score(header, samples, field)))
            .max_by(|a, b| {
                a.1.score
                    .partial_cmp(&b.1.score)
                    .unwrap_or(Ordering::Equal)
                    // Alphabetically first field wins a tie.
                    .then_with(|| b.0.cmp(a.0))
            });

        match best {
            Some((field, score)) if score.score >= self.threshold => Suggestion {
                header: header.to_string(),
                field: Some(field.clone()),
                score,
            },
            Some((_, score)) => Suggestion {
                header: header.to_string(),
                field: None,
                score,
            },
            None => Suggestion {
                header: header.to_string(),
                field: None,
                score: ColumnScore {
                    score: 0.0,
                    explanation: Vec::new(),
                },
            },
        }
    }

    /// Builds a suggestion table for every column.
    ///
    /// Headers without a field above the threshold get an empty field, which
    /// the suggestion engine reads as "no suggestion".
    pub fn build_table(&self, columns: &[RawColumn]) -> SuggestionTable {
        columns
            .iter()
            .map(|column| {
                let suggestion = self.best_match(&column.name, &column.sample_values);
                let confidence = suggestion.score.score.round();
                (
                    column.name.clone(),
                    PriorSuggestion::new(suggestion.field.unwrap_or_default(), confidence),
                )
            })
            .collect()
    }

    fn compute_score(&self, header: &str, samples: &[String], field: &str) -> ColumnScore {
        let mut components = Vec::new();

        let base = jaro_winkler::similarity(
            normalize_text(header).chars(),
            normalize_text(field).chars(),
        );
        components.push(ScoreComponent {
            name: "Name similarity",
            value: base,
            description: format!("'{header}' vs '{field}'"),
        });

        let mut score = base;
        if let Some(field_type) = self.schema.field_type(field) {
            score = apply_type_adjustment(field_type, samples, score, &mut components);
        }

        ColumnScore {
            score: (score * 100.0).clamp(0.0, 100.0),
            explanation: components,
        }
    }
}

fn apply_type_adjustment(
    field_type: FieldType,
    samples: &[String],
    mut score: f64,
    components: &mut Vec<ScoreComponent>,
) -> f64 {
    if matches!(field_type, FieldType::String | FieldType::Popover) {
        return score;
    }
    let filled: Vec<&String> = samples.iter().filter(|s| !s.trim().is_empty()).collect();
    if filled.is_empty() {
        return score;
    }
    let converting = filled.iter().filter(|s| converts(s, field_type)).count();
    if converting == filled.len() {
        score *= TYPE_AGREEMENT_BOOST;
        components.push(ScoreComponent {
            name: "Type agreement",
            value: TYPE_AGREEMENT_BOOST - 1.0,
            description: format!("All samples convert to {field_type}"),
        });
    } else if converting == 0 {
        score *= TYPE_MISMATCH_PENALTY;
        components.push(ScoreComponent {
            name: "Type mismatch",
            value: TYPE_MISMATCH_PENALTY - 1.0,
            description: format!("No sample converts to {field_type}"),
        });
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_exact_match_high_score() {
        let engine = ScoringEngine::new(FieldSchema::standard());
        let score = engine.score("City", &[], "city").unwrap();
        assert!(score.score > 95.0, "got {}", score.score);
    }

    #[test]
    fn test_unknown_field() {
        let engine = ScoringEngine::new(FieldSchema::standard());
        assert!(engine.score("City", &[], "no_such_field").is_none());
    }

    #[test]
    fn test_type_agreement_changes_score() {
        let engine = ScoringEngine::new(FieldSchema::standard());
        let numeric = engine
            .score("Floor Area", &samples(&["1,200", "800"]), "gross_floor_area")
            .unwrap();
        let text = engine
            .score("Floor Area", &samples(&["big", "small"]), "gross_floor_area")
            .unwrap();
        assert!(numeric.score > text.score);
        assert!(numeric.explain().contains("Type agreement"));
        assert!(text.explain().contains("Type mismatch"));
    }

    #[test]
    fn test_previous_mapping_wins() {
        let mut previous = BTreeMap::new();
        previous.insert("BBL".to_string(), "tax_lot_id".to_string());
        let engine = ScoringEngine::new(FieldSchema::standard()).with_previous(previous);

        let suggestion = engine.best_match("BBL", &[]);
        assert_eq!(suggestion.field.as_deref(), Some("tax_lot_id"));
        assert_eq!(suggestion.score.score, 100.0);
    }

    #[test]
    fn test_not_one_to_one() {
        let engine = ScoringEngine::new(FieldSchema::standard());
        let columns = vec![
            RawColumn::new("Postal Code", 1, Vec::new()),
            RawColumn::new("postal_code", 2, Vec::new()),
        ];
        let table = engine.build_table(&columns);
        assert_eq!(table["Postal Code"].field, "postal_code");
        assert_eq!(table["postal_code"].field, "postal_code");
    }

    #[test]
    fn test_below_threshold_is_empty() {
        let engine = ScoringEngine::new(FieldSchema::standard()).with_threshold(101.0);
        let columns = vec![RawColumn::new("City", 1, Vec::new())];
        let table = engine.build_table(&columns);
        assert_eq!(table["City"].field, "");
    }
}
