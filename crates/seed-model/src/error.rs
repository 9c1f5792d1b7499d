use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid building id: {0:?}")]
    InvalidBuildingId(String),
    #[error("invalid job key: {0:?}")]
    InvalidJobKey(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// A collaborator call failed at the boundary.
///
/// The engine never retries on its own; retrying is an operator action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct TransportError {
    /// Collaborator operation that failed (e.g. `save_mappings`).
    pub operation: &'static str,
    /// Failure detail reported by the transport.
    pub message: String,
}

impl TransportError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
