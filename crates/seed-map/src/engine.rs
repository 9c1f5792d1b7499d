//! Mapping suggestion engine.
//!
//! Applies a table of prior suggestions to the raw columns of an upload,
//! validates each column's samples against its target type and keeps the
//! duplicate flags current across the whole set.

use seed_model::{FieldSchema, FieldType, RawColumn, SuggestionTable, Validity};
use tracing::debug;

use crate::conflict;
use crate::error::MappingError;
use crate::validate::validate;

/// Stateless suggestion and validation over a sequence of raw columns.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    schema: FieldSchema,
}

impl MappingEngine {
    pub fn new(schema: FieldSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Adopts the prior suggestion of every column whose header is a key of
    /// `prior`, empties the suggestion of every other column, then validates
    /// each column and recomputes duplicates.
    ///
    /// Concat parameters stay unmapped and concatenated columns keep the
    /// target the operator gave them.
    pub fn suggest(&self, columns: &mut [RawColumn], prior: &SuggestionTable) {
        for column in columns.iter_mut() {
            if column.is_concat_parameter || column.is_concatenated {
                self.validate_column(column);
                continue;
            }
            match prior.get(&column.name) {
                Some(entry) if !entry.field.is_empty() => {
                    column.suggestion = Some(entry.field.clone());
                    column.confidence = Some(entry.confidence);
                }
                _ => {
                    column.suggestion = None;
                    column.confidence = None;
                }
            }
            column.user_suggestion = false;
            column.is_extra_data = false;
            self.validate_column(column);
            debug!(
                column = %column.name,
                suggestion = column.target().unwrap_or(""),
                validity = column.validity.as_str(),
                "suggested column mapping"
            );
        }
        conflict::detect(columns);
    }

    /// Declared type of the column's target; extra-data targets are untyped.
    pub fn target_type(&self, column: &RawColumn) -> Option<FieldType> {
        if column.is_extra_data {
            return None;
        }
        column
            .target()
            .and_then(|field| self.schema.field_type(field))
    }

    /// Re-validates one column against its current target.
    pub fn validate_column(&self, column: &mut RawColumn) {
        if column.target().is_none() {
            column.suggestion_type = None;
            column.invalid_samples.clear();
            column.validity = Validity::Unset;
            return;
        }
        let field_type = self.target_type(column);
        column.suggestion_type = field_type;
        column.invalid_samples = validate(&column.sample_values, field_type);
        column.validity =
            Validity::from_counts(column.invalid_samples.len(), column.sample_values.len());
    }

    /// Operator override of the column at `index`.
    ///
    /// Only that column is re-validated; duplicates are recomputed for every
    /// column since the change can create or resolve a conflict elsewhere.
    pub fn set_suggestion(
        &self,
        columns: &mut [RawColumn],
        index: usize,
        field: Option<&str>,
        is_extra_data: bool,
    ) -> Result<(), MappingError> {
        let column = columns
            .get_mut(index)
            .ok_or_else(|| MappingError::ColumnNotFound(format!("#{index}")))?;
        column.suggestion = field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        column.is_extra_data = is_extra_data && column.suggestion.is_some();
        column.user_suggestion = true;
        self.validate_column(column);
        debug!(
            column = %column.name,
            suggestion = column.target().unwrap_or(""),
            is_extra_data = column.is_extra_data,
            validity = column.validity.as_str(),
            "operator changed column mapping"
        );
        conflict::detect(columns);
        Ok(())
    }
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new(FieldSchema::standard())
    }
}

#[cfg(test)]
mod tests {
    use seed_model::PriorSuggestion;

    use super::*;

    fn column(name: &str, samples: &[&str]) -> RawColumn {
        let samples = samples.iter().map(|s| (*s).to_string()).collect();
        RawColumn::new(name, 1, samples)
    }

    #[test]
    fn suggest_adopts_exact_header_matches_only() {
        let engine = MappingEngine::default();
        let mut columns = vec![
            column("GFA", &["1,000", "n/a"]),
            column("gfa", &["1"]),
            column("Notes", &["x"]),
        ];
        let mut prior = SuggestionTable::new();
        prior.insert("GFA".into(), PriorSuggestion::new("gross_floor_area", 88.0));
        prior.insert("Notes".into(), PriorSuggestion::new("", 0.0));

        engine.suggest(&mut columns, &prior);

        assert_eq!(columns[0].target(), Some("gross_floor_area"));
        assert_eq!(columns[0].confidence, Some(88.0));
        assert_eq!(columns[0].suggestion_type, Some(FieldType::Numeric));
        assert_eq!(columns[0].invalid_samples, vec!["n/a"]);
        assert_eq!(columns[0].validity, Validity::Semivalid);
        assert_eq!(columns[1].target(), None);
        assert_eq!(columns[1].validity, Validity::Unset);
        assert_eq!(columns[2].target(), None);
    }

    #[test]
    fn override_revalidates_and_rechecks_duplicates() {
        let engine = MappingEngine::default();
        let mut columns = vec![
            column("City", &["Denver"]),
            column("Town", &["Boulder"]),
        ];
        let mut prior = SuggestionTable::new();
        prior.insert("City".into(), PriorSuggestion::new("city", 90.0));
        engine.suggest(&mut columns, &prior);
        assert!(!columns[0].is_duplicate);

        engine
            .set_suggestion(&mut columns, 1, Some("city"), false)
            .expect("override");
        assert!(columns[0].is_duplicate);
        assert!(columns[1].is_duplicate);
        assert!(columns[1].user_suggestion);
        assert_eq!(columns[1].validity, Validity::Valid);

        engine
            .set_suggestion(&mut columns, 1, None, false)
            .expect("clear");
        assert!(!columns[0].is_duplicate);
        assert_eq!(columns[1].validity, Validity::Unset);
    }

    #[test]
    fn extra_data_targets_are_untyped() {
        let engine = MappingEngine::default();
        let mut columns = vec![column("Floor area note", &["big"])];
        engine
            .set_suggestion(&mut columns, 0, Some("gross_floor_area"), true)
            .expect("override");
        assert_eq!(columns[0].suggestion_type, None);
        assert_eq!(columns[0].validity, Validity::Valid);
    }

    #[test]
    fn override_out_of_range_fails() {
        let engine = MappingEngine::default();
        let mut columns = vec![column("A", &[])];
        assert_eq!(
            engine.set_suggestion(&mut columns, 3, Some("city"), false),
            Err(MappingError::ColumnNotFound("#3".into()))
        );
    }
}
