//! Configuration build errors

use thiserror::Error;

/// A configuration failed validation at build time
///
/// Raised only by `build()`/`merge()`, never while a session is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid configuration: {field} {reason}")]
pub struct InvalidConfig {
    /// Name of the offending field
    pub field: &'static str,
    /// Human readable constraint that was violated
    pub reason: String,
}

impl InvalidConfig {
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
