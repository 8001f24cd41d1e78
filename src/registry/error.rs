//! Registry-specific error types
//!
//! - **`ThresholdExceeded`**: the registry is full
//! - **`DuplicateItem`**: the locator is already selected
//! - **`IndexOutOfRange`**: a positional operation referenced a missing slot
//!
//! The first two are routinely recovered by the session; the last one means
//! the caller's view of the selection is out of sync with the registry.

use crate::media::Locator;
use thiserror::Error;

/// Registry mutation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Adding would exceed the selection threshold
    #[error("Selection is full ({threshold} item(s) maximum)")]
    ThresholdExceeded { threshold: usize },

    /// The locator is already part of the selection
    #[error("Already selected: {0}")]
    DuplicateItem(Locator),

    /// Index does not address an existing entry
    #[error("Index {index} out of range for selection of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
