//! Utility functions for mapping operations.

/// Normalizes text for comparison by lowercasing and replacing separators with spaces.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['_', '-', '.', '/', '\\', '(', ')', '#'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trims whitespace from a column name, preserving the original casing.
pub fn safe_column_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Display name of a column built by concatenating `headers`.
pub fn concat_name(headers: &[String]) -> String {
    headers.join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_text("  Gross_Floor-Area (ft2) "), "gross floor area ft2");
        assert_eq!(normalize_text("PM Property ID#"), "pm property id");
    }

    #[test]
    fn concat_name_joins_headers() {
        let headers = vec!["Number".to_string(), "Street".to_string()];
        assert_eq!(concat_name(&headers), "Number + Street");
    }
}
