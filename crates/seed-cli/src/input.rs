//! Reading uploaded files and parsing command-line operations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use seed_model::BuildingId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::logging::redact_value;

/// Header row and the first data rows of a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSample {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Reads the header and up to `rows` data rows of `path`.
///
/// Rows may be shorter or longer than the header; cells are trimmed.
pub fn read_sample(path: &Path, rows: usize) -> Result<CsvSample> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut sample = Vec::with_capacity(rows);
    for (index, record) in reader.records().take(rows).enumerate() {
        let record =
            record.with_context(|| format!("Failed to read row {} of {}", index + 1, path.display()))?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        for (header, value) in headers.iter().zip(&row) {
            trace!(row = index + 1, %header, value = redact_value(value), "sample cell");
        }
        sample.push(row);
    }
    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = sample.len(),
        "read sample rows"
    );
    Ok(CsvSample {
        headers,
        rows: sample,
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// `HEADER=FIELD`; an empty field ignores the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub header: String,
    pub field: Option<String>,
}

/// `FIELD=H1,H2,...`: merge headers into one column mapped to `FIELD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenation {
    pub field: String,
    pub headers: Vec<String>,
}

/// `ID:KEY`: take the value of `KEY` from source building `ID`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adoption {
    pub source: BuildingId,
    pub key: String,
}

/// `FIELD=VALUE`: hand-edit a value. JSON literals keep their type, anything
/// else is a string.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub field: String,
    pub value: serde_json::Value,
}

pub fn parse_assignment(value: &str) -> Result<Assignment, String> {
    let (header, field) = value
        .split_once('=')
        .ok_or_else(|| format!("expected HEADER=FIELD, got '{value}'"))?;
    if header.is_empty() {
        return Err(format!("missing header in '{value}'"));
    }
    let field = field.trim();
    Ok(Assignment {
        header: header.to_string(),
        field: (!field.is_empty()).then(|| field.to_string()),
    })
}

pub fn parse_concatenation(value: &str) -> Result<Concatenation, String> {
    let (field, headers) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=H1,H2, got '{value}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field in '{value}'"));
    }
    let headers: Vec<String> = headers
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect();
    if headers.len() < 2 {
        return Err(format!("at least two headers are needed in '{value}'"));
    }
    Ok(Concatenation {
        field: field.to_string(),
        headers,
    })
}

pub fn parse_adoption(value: &str) -> Result<Adoption, String> {
    let (id, key) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ID:KEY, got '{value}'"))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid building id in '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{value}'"));
    }
    Ok(Adoption {
        source: BuildingId::new(id),
        key: key.to_string(),
    })
}

pub fn parse_edit(value: &str) -> Result<Edit, String> {
    let (field, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{value}'"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field in '{value}'"));
    }
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok(Edit {
        field: field.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_ignores_the_column() {
        let assignment = parse_assignment("Notes=").unwrap();
        assert_eq!(assignment.header, "Notes");
        assert_eq!(assignment.field, None);
        assert!(parse_assignment("Notes").is_err());
    }

    #[test]
    fn concatenation_needs_two_headers() {
        let concat = parse_concatenation("address_line_1=Number, Street").unwrap();
        assert_eq!(concat.headers, vec!["Number", "Street"]);
        assert!(parse_concatenation("address_line_1=Number").is_err());
    }

    #[test]
    fn adoption_parses_building_id() {
        let adoption = parse_adoption("12:gross_floor_area").unwrap();
        assert_eq!(adoption.source, BuildingId::new(12));
        assert!(parse_adoption("x:city").is_err());
    }

    #[test]
    fn edits_keep_json_types() {
        assert_eq!(parse_edit("year_built=1931").unwrap().value, serde_json::json!(1931));
        assert_eq!(
            parse_edit("city=Boston").unwrap().value,
            serde_json::json!("Boston")
        );
    }
}
