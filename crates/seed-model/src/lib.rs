pub mod building;
pub mod column;
pub mod confidence;
pub mod error;
pub mod ids;
pub mod job;
pub mod mapping;
pub mod matching;
pub mod schema;

pub use building::BuildingRecord;
pub use column::{PriorSuggestion, RawColumn, SuggestionTable, Validity};
pub use confidence::{ConfidenceLevel, ConfidenceThresholds};
pub use error::{ModelError, Result, TransportError};
pub use ids::{BuildingId, FileId, JobKey, OrgContext, OrgId};
pub use job::{JobProgress, JobStatus};
pub use mapping::{ColumnMapping, MappingSource, SourceType};
pub use matching::{
    BuildingPage, BuildingQuery, MatchCandidate, MatchCounts, MatchFilter, MatchOutcome, MatchRow,
    MatchState,
};
pub use schema::{FieldSchema, FieldType};
