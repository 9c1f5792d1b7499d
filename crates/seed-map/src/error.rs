//! Error types for mapping operations.

use std::fmt;

/// Errors from mapping operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// No column at this position.
    ColumnNotFound(String),
    /// Two or more columns target the same canonical field.
    Conflict { fields: Vec<String> },
    /// Concatenation needs at least two distinct, unmerged columns.
    InvalidConcat(String),
    /// Column is not the result of a concatenation.
    NotConcatenated(String),
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound(c) => write!(f, "Column not found: {c}"),
            Self::Conflict { fields } => {
                write!(
                    f,
                    "Fields mapped by more than one column: {}",
                    fields.join(", ")
                )
            }
            Self::InvalidConcat(reason) => write!(f, "Cannot concatenate columns: {reason}"),
            Self::NotConcatenated(c) => write!(f, "Column '{c}' is not concatenated"),
        }
    }
}

impl std::error::Error for MappingError {}
