//! Mediapick - media selection session orchestrator
//!
//! Combines grid picking, camera capture and cropping into one ordered,
//! bounded selection. A [`session::SelectionSession`] owns the selection,
//! runs at most one sub-flow at a time and reports its outcome exactly once.

use thiserror::Error;

pub mod cli;
pub mod commands;
pub mod config;
pub mod flow;
pub mod logging;
pub mod media;
pub mod output;
pub mod registry;
pub mod session;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum MediapickError {
    /// A picker, capture or crop config failed validation
    #[error(transparent)]
    InvalidConfig(#[from] config::InvalidConfig),
    /// Settings file or environment could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Selection registry error
    #[error("Registry error: {0}")]
    RegistryError(#[from] registry::RegistryError),
    /// Sub-flow error
    #[error("Sub-flow error: {0}")]
    FlowError(#[from] flow::FlowError),
    /// Session intent rejected
    #[error("Session error: {0}")]
    SessionError(#[from] session::SessionError),
    /// Session store error
    #[error("Session store error: {0}")]
    StoreError(#[from] session::StoreError),
    /// Script step could not be parsed
    #[error("Script error: {0}")]
    ScriptError(#[from] cli::ScriptError),
    /// JSON output failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// No suspended session with this name
    #[error("No suspended session named '{0}'")]
    SessionNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let error: MediapickError = config::InvalidConfig::new("threshold", "must be at least 1").into();
        assert_eq!(
            error.to_string(),
            "Invalid configuration: threshold must be at least 1"
        );

        let error: MediapickError = session::SessionError::CaptureUnsupported.into();
        assert!(error.to_string().starts_with("Session error"));

        let error = MediapickError::SessionNotFound("trip".into());
        assert_eq!(error.to_string(), "No suspended session named 'trip'");
    }
}
