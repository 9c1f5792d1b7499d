//! Mapping session state for the interactive mapping step.
//!
//! A session owns the raw columns of one uploaded file from the moment the
//! headers and sample rows are loaded until the mapping is committed.

use seed_model::{
    ColumnMapping, ConfidenceThresholds, RawColumn, SuggestionTable, Validity,
};
use tracing::{debug, info, warn};

use crate::conflict;
use crate::engine::MappingEngine;
use crate::error::MappingError;
use crate::utils::{concat_name, safe_column_name};

/// State of the mapping step for a single import file.
#[derive(Debug, Clone)]
pub struct MappingSession {
    engine: MappingEngine,
    thresholds: ConfidenceThresholds,
    columns: Vec<RawColumn>,
}

impl MappingSession {
    pub fn new(
        engine: MappingEngine,
        thresholds: ConfidenceThresholds,
        columns: Vec<RawColumn>,
    ) -> Self {
        Self {
            engine,
            thresholds,
            columns,
        }
    }

    /// Creates one raw column per header, taking the column's cells from
    /// each sample row. Short rows contribute an empty cell.
    pub fn from_samples(
        headers: &[String],
        rows: &[Vec<String>],
        engine: MappingEngine,
        thresholds: ConfidenceThresholds,
    ) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let samples = rows
                    .iter()
                    .map(|row| row.get(idx).cloned().unwrap_or_default())
                    .collect();
                RawColumn::new(safe_column_name(header), idx + 1, samples)
            })
            .collect();
        Self::new(engine, thresholds, columns)
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&RawColumn> {
        self.columns.get(index)
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    /// Position of the first directly mappable column with this header.
    pub fn position(&self, header: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == header && !c.is_concat_parameter)
    }

    /// Applies a prior suggestion table to every column.
    pub fn suggest(&mut self, prior: &SuggestionTable) {
        self.engine.suggest(&mut self.columns, prior);
        debug!(
            columns = self.columns.len(),
            conflicts = self.has_conflicts(),
            "applied suggestions"
        );
    }

    /// Operator override by column position.
    pub fn set_suggestion(
        &mut self,
        index: usize,
        field: Option<&str>,
        is_extra_data: bool,
    ) -> Result<(), MappingError> {
        if self
            .columns
            .get(index)
            .is_some_and(|c| c.is_concat_parameter)
        {
            return Err(MappingError::InvalidConcat(format!(
                "'{}' is merged into a concatenated column",
                self.columns[index].name
            )));
        }
        self.engine
            .set_suggestion(&mut self.columns, index, field, is_extra_data)
    }

    /// Operator override by header name.
    pub fn set_suggestion_by_header(
        &mut self,
        header: &str,
        field: Option<&str>,
        is_extra_data: bool,
    ) -> Result<(), MappingError> {
        let index = self
            .position(header)
            .ok_or_else(|| MappingError::ColumnNotFound(header.to_string()))?;
        self.set_suggestion(index, field, is_extra_data)
    }

    /// Merges two or more columns into a new concatenated column mapped to
    /// `field`. Returns the position of the new column.
    ///
    /// Sample values are joined per row with a single space. The input
    /// columns become concat parameters and lose their own target.
    pub fn concatenate(
        &mut self,
        headers: &[String],
        field: Option<&str>,
    ) -> Result<usize, MappingError> {
        if headers.len() < 2 {
            return Err(MappingError::InvalidConcat(
                "at least two columns are required".to_string(),
            ));
        }
        let mut indices = Vec::with_capacity(headers.len());
        for header in headers {
            let index = self
                .columns
                .iter()
                .position(|c| {
                    &c.name == header && !c.is_concat_parameter && !c.is_concatenated
                })
                .ok_or_else(|| {
                    MappingError::InvalidConcat(format!("'{header}' is not available"))
                })?;
            if indices.contains(&index) {
                return Err(MappingError::InvalidConcat(format!(
                    "'{header}' is listed twice"
                )));
            }
            indices.push(index);
        }

        let rows = indices
            .iter()
            .map(|&i| self.columns[i].sample_values.len())
            .max()
            .unwrap_or(0);
        let samples = (0..rows)
            .map(|row| {
                indices
                    .iter()
                    .filter_map(|&i| self.columns[i].sample_values.get(row))
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        for &i in &indices {
            let column = &mut self.columns[i];
            column.is_concat_parameter = true;
            column.suggestion = None;
            column.confidence = None;
            column.is_extra_data = false;
            self.engine.validate_column(column);
        }

        let mut merged = RawColumn::new(concat_name(headers), self.columns.len() + 1, samples);
        merged.is_concatenated = true;
        merged.source_headers = headers.to_vec();
        merged.source_rows = indices.iter().map(|&i| self.columns[i].row_index).collect();
        merged.suggestion = field
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        merged.user_suggestion = true;
        self.engine.validate_column(&mut merged);
        self.columns.push(merged);
        conflict::detect(&mut self.columns);

        let index = self.columns.len() - 1;
        debug!(
            column = %self.columns[index].name,
            sources = headers.len(),
            "concatenated columns"
        );
        Ok(index)
    }

    /// Removes a concatenated column and releases its input columns.
    pub fn split(&mut self, index: usize) -> Result<(), MappingError> {
        let column = self
            .columns
            .get(index)
            .ok_or_else(|| MappingError::ColumnNotFound(format!("#{index}")))?;
        if !column.is_concatenated {
            return Err(MappingError::NotConcatenated(column.name.clone()));
        }
        let merged = self.columns.remove(index);
        for source in self
            .columns
            .iter_mut()
            .filter(|c| c.is_concat_parameter && merged.source_rows.contains(&c.row_index))
        {
            source.is_concat_parameter = false;
            self.engine.validate_column(source);
        }
        conflict::detect(&mut self.columns);
        Ok(())
    }

    pub fn has_conflicts(&self) -> bool {
        conflict::duplicates_present(&self.columns)
    }

    pub fn conflicting_fields(&self) -> Vec<String> {
        conflict::conflicting_fields(&self.columns)
    }

    /// Whether the "proceed to matching" action is enabled.
    pub fn can_proceed(&self) -> bool {
        !self.has_conflicts()
    }

    /// The committed mapping list, refused while any conflict remains.
    pub fn commit(&self) -> Result<Vec<ColumnMapping>, MappingError> {
        if self.has_conflicts() {
            let fields = self.conflicting_fields();
            warn!(fields = ?fields, "refusing to commit mapping with conflicts");
            return Err(MappingError::Conflict { fields });
        }
        let mappings = conflict::committed_mappings(&self.columns);
        info!(mappings = mappings.len(), "committed column mapping");
        Ok(mappings)
    }

    /// Confidence tier label of the column at `index`.
    pub fn confidence_label(&self, index: usize) -> Option<&'static str> {
        self.columns
            .get(index)?
            .confidence_level(&self.thresholds)
            .map(|level| level.label())
    }

    /// Rendering status of one sample cell of the column at `index`.
    pub fn cell_status(&self, index: usize, value: &str) -> CellStatus {
        let Some(column) = self.columns.get(index) else {
            return CellStatus::Plain;
        };
        if column.target().is_none() {
            return CellStatus::Plain;
        }
        match column.validity {
            Validity::Valid => CellStatus::Valid,
            Validity::Semivalid if column.is_invalid_sample(value) => CellStatus::Warning,
            Validity::Invalid if column.is_invalid_sample(value) => CellStatus::Invalid,
            _ => CellStatus::Plain,
        }
    }

    /// Get summary counts.
    pub fn summary(&self) -> MappingSummary {
        let mut summary = MappingSummary::default();
        for column in &self.columns {
            if column.is_concat_parameter {
                summary.merged += 1;
                continue;
            }
            summary.total += 1;
            if column.target().is_some() {
                summary.mapped += 1;
            } else {
                summary.ignored += 1;
            }
            if column.is_duplicate {
                summary.duplicates += 1;
            }
            match column.validity {
                Validity::Semivalid => summary.semivalid += 1,
                Validity::Invalid => summary.invalid += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Rendering status of a sample cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStatus {
    /// Column is ignored, or the value is not one of the failing samples.
    Plain,
    /// Every sample of the column converts.
    Valid,
    /// Failing value in a column where some samples convert.
    Warning,
    /// Failing value in a column where no sample converts.
    Invalid,
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSummary {
    /// Columns that are mapped directly (concat parameters excluded).
    pub total: usize,
    pub mapped: usize,
    pub ignored: usize,
    /// Columns merged into a concatenated column.
    pub merged: usize,
    pub duplicates: usize,
    pub semivalid: usize,
    pub invalid: usize,
}
