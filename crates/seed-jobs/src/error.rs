use seed_map::MappingError;
use seed_model::{JobKey, TransportError};
use thiserror::Error;

/// Errors of long-running jobs and the workflows that start them.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {key} finished with an error")]
    Failed { key: JobKey },
    #[error("job {key} finished with a warning")]
    Warning { key: JobKey },
    /// The collaborator refused to start the job.
    #[error("{operation} was rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("job {key} was cancelled")]
    Cancelled { key: JobKey },
    #[error("polling task for job {key} stopped: {message}")]
    Interrupted { key: JobKey, message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

pub type Result<T> = std::result::Result<T, JobError>;

impl JobError {
    /// Short notice for the operator; details go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Failed { .. } => "The job failed. Review the data and try again.",
            Self::Warning { .. } => {
                "The job stopped with a warning. Resolve the reported issues and run it again."
            }
            Self::Rejected { .. } => "The request was rejected by the server.",
            Self::Cancelled { .. } => "The job was cancelled.",
            Self::Mapping(MappingError::Conflict { .. }) => {
                "Some columns are mapped to the same field. Resolve the duplicates to continue."
            }
            Self::Mapping(_) => "The column mapping is not valid.",
            Self::Interrupted { .. } | Self::Transport(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicts_get_their_own_notice() {
        let err = JobError::from(MappingError::Conflict {
            fields: vec!["city".into()],
        });
        assert!(err.user_message().contains("duplicates"));
        assert_eq!(
            err.to_string(),
            "Fields mapped by more than one column: city"
        );
    }

    #[test]
    fn transport_is_generic() {
        let err = JobError::from(TransportError::new("start_mapping", "502"));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert_eq!(err.to_string(), "start_mapping failed: 502");
    }
}
