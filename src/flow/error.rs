//! Collaborator error types

use thiserror::Error;

/// Errors raised by a media source
#[derive(Debug, Error)]
pub enum FlowError {
    /// The user backed out of the collaborator's UI
    #[error("Operation was cancelled")]
    Cancelled,

    /// The media index could not be queried
    #[error("Media query failed: {0}")]
    Query(String),
}
