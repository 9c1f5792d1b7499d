//! Type validation of sample values against a declared field type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use seed_model::FieldType;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];

/// Returns the samples that do not convert to `field_type`, in input order.
///
/// Blank samples never fail. Without a declared type nothing is invalid.
/// A failing value that occurs several times is reported once per occurrence.
pub fn validate(samples: &[String], field_type: Option<FieldType>) -> Vec<String> {
    let Some(field_type) = field_type else {
        return Vec::new();
    };
    samples
        .iter()
        .filter(|value| !converts(value, field_type))
        .cloned()
        .collect()
}

/// Whether a single value converts to `field_type`.
pub fn converts(value: &str, field_type: FieldType) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    match field_type {
        FieldType::Numeric => parse_number(trimmed).is_some(),
        FieldType::Date => parse_date(trimmed).is_some(),
        FieldType::String | FieldType::Popover => true,
    }
}

/// Parses a numeric cell, tolerating thousands separators and a currency sign.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a date cell in any of the accepted layouts.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn numeric_rejects_text() {
        let input = samples(&["12,000", "abc", "", "$4.5", "NaN"]);
        assert_eq!(
            validate(&input, Some(FieldType::Numeric)),
            vec!["abc", "NaN"]
        );
    }

    #[test]
    fn dates_in_several_layouts() {
        assert!(converts("2014-03-01", FieldType::Date));
        assert!(converts("03/01/2014", FieldType::Date));
        assert!(converts("3/1/14", FieldType::Date));
        assert!(converts("2014-03-01T10:00:00Z", FieldType::Date));
        assert!(!converts("2014-13-01", FieldType::Date));
        assert!(!converts("last tuesday", FieldType::Date));
    }

    #[test]
    fn untyped_and_text_targets_accept_everything() {
        let input = samples(&["x", "1", "?"]);
        assert!(validate(&input, None).is_empty());
        assert!(validate(&input, Some(FieldType::String)).is_empty());
        assert!(validate(&input, Some(FieldType::Popover)).is_empty());
    }

    #[test]
    fn repeated_failures_are_kept() {
        let input = samples(&["n/a", "10", "n/a"]);
        assert_eq!(
            validate(&input, Some(FieldType::Numeric)),
            vec!["n/a", "n/a"]
        );
    }
}
