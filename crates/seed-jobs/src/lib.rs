#![deny(unsafe_code)]

//! Long-running jobs of the reconciliation engine: progress polling, the
//! collaborator backend and the mapping, matching and export workflows.

pub mod backend;
pub mod error;
pub mod export;
pub mod progress;
pub mod workflow;

pub use backend::{
    ColumnSamples, ExportFormat, ExportRequest, ExportTicket, RemapResponse, RemapStatus,
    SeedBackend, SuggestedMappings,
};
pub use error::{JobError, Result};
pub use export::{ExportJob, ExportWorkflow};
pub use progress::{
    JobHandle, JobRunner, JobRunnerConfig, ProgressDisplay, ProgressSource, ProgressTarget,
    SharedProgress,
};
pub use workflow::MappingWorkflow;
