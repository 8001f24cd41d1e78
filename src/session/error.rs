//! Session-specific error types
//!
//! - **`Terminated`**: the session already resolved, cancelled or failed
//! - **`InvalidTransition`**: the intent is not valid in the current state
//! - **`CaptureUnsupported`** / **`CropUnsupported`**: the config lacks the sub-config
//! - **`CropRequiresImage`**: cropping was requested on a GIF or video
//! - **`NothingToPreview`**, **`NoSuchCandidate`**, **`UnknownFolder`**: the
//!   grid was asked for something it does not show
//! - **`Desync`**: the presentation referenced a selection slot that does not
//!   exist; fatal, the session fails
//! - **`ResultAlreadyRegistered`**: `on_result`/`subscribe` called twice
//! - **`NotResumable`**: a persisted snapshot is inconsistent
//!
//! Threshold overflows and duplicates are not errors at this level; the
//! session reports them as notices.

use super::SessionState;
use crate::config::InvalidConfig;
use crate::media::{Locator, MediaKind};
use crate::registry::RegistryError;
use thiserror::Error;

/// Session result type
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors returned by session intents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session already finished ({0})")]
    Terminated(SessionState),

    #[error("Cannot {intent} while {state}")]
    InvalidTransition {
        state: SessionState,
        intent: &'static str,
    },

    #[error("Capture is not configured for this session")]
    CaptureUnsupported,

    #[error("Crop is not configured for this session")]
    CropUnsupported,

    #[error("Only images can be cropped: {0} is a {1}")]
    CropRequiresImage(Locator, MediaKind),

    #[error("Nothing selected to preview")]
    NothingToPreview,

    #[error("No candidate at position {position} (grid shows {len})")]
    NoSuchCandidate { position: usize, len: usize },

    #[error("No folder {index} (there are {count})")]
    UnknownFolder { index: usize, count: usize },

    #[error("Selection out of sync: {0}")]
    Desync(RegistryError),

    #[error("A result handler is already registered")]
    ResultAlreadyRegistered,

    #[error("Snapshot cannot be resumed: {0}")]
    NotResumable(String),

    #[error(transparent)]
    Config(#[from] InvalidConfig),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
