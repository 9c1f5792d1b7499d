#![deny(unsafe_code)]

//! Column mapping for uploaded building files: suggestion, type
//! validation, conflict detection and the committed mapping list.

pub mod conflict;
pub mod engine;
pub mod error;
pub mod repository;
pub mod score;
pub mod state;
pub mod utils;
pub mod validate;

pub use conflict::{committed_mappings, conflicting_fields, detect};
pub use engine::MappingEngine;
pub use error::MappingError;
pub use repository::{MappingMetadata, MappingRepository, StoredMapping};
pub use score::{ColumnScore, ScoreComponent, ScoringEngine, Suggestion};
pub use state::{CellStatus, MappingSession, MappingSummary};
pub use validate::validate;
