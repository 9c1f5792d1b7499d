//! Detection of raw columns that claim the same canonical field.

use std::collections::BTreeMap;

use seed_model::{ColumnMapping, MappingSource, RawColumn};

/// Marks every column whose non-empty target is shared with another column.
///
/// Recomputes the flag for the whole set, so a changed suggestion resolves
/// or creates conflicts elsewhere too.
pub fn detect(columns: &mut [RawColumn]) {
    let flags: Vec<bool> = {
        let counts = target_counts(columns);
        columns
            .iter()
            .map(|column| {
                column
                    .target()
                    .is_some_and(|target| counts.get(target).copied().unwrap_or(0) > 1)
            })
            .collect()
    };
    for (column, duplicate) in columns.iter_mut().zip(flags) {
        column.is_duplicate = duplicate;
    }
}

/// Canonical fields targeted by more than one column, sorted.
pub fn conflicting_fields(columns: &[RawColumn]) -> Vec<String> {
    target_counts(columns)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(field, _)| field.to_string())
        .collect()
}

/// True while any column is flagged as a duplicate.
pub fn duplicates_present(columns: &[RawColumn]) -> bool {
    columns.iter().any(|c| c.is_duplicate)
}

/// Flattens the columns into the committed `[(field, header-or-headers)]` list.
///
/// Concat parameters are skipped; concatenated columns carry their source
/// headers instead of their own name.
pub fn committed_mappings(columns: &[RawColumn]) -> Vec<ColumnMapping> {
    columns
        .iter()
        .filter(|column| !column.is_concat_parameter)
        .map(|column| {
            let source = if column.is_concatenated {
                MappingSource::Concatenated(column.source_headers.clone())
            } else {
                MappingSource::Header(column.name.clone())
            };
            ColumnMapping {
                field: column.target().map(str::to_string),
                source,
            }
        })
        .collect()
}

fn target_counts(columns: &[RawColumn]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for target in columns.iter().filter_map(RawColumn::target) {
        *counts.entry(target).or_insert(0) += 1;
    }
    counts
}
