use serde::{Deserialize, Serialize};

/// Raw side of a committed mapping: a single header or the ordered headers
/// of a concatenated column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingSource {
    Header(String),
    Concatenated(Vec<String>),
}

/// One entry of the committed mapping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Canonical field; `None` marks an ignored column.
    pub field: Option<String>,
    pub source: MappingSource,
}

/// Import source category a mapping was saved for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    AssessedRaw,
    PortfolioRaw,
    GreenButtonRaw,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssessedRaw => "assessed_raw",
            Self::PortfolioRaw => "portfolio_raw",
            Self::GreenButtonRaw => "green_button_raw",
        }
    }

    /// Parse the loose labels used on import files ("Portfolio Raw", ...).
    ///
    /// Unknown labels fall back to assessed data.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "PORTFOLIO_RAW" => Self::PortfolioRaw,
            "GREEN_BUTTON_RAW" => Self::GreenButtonRaw,
            _ => Self::AssessedRaw,
        }
    }
}
