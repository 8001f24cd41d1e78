//! Sub-flow controllers
//!
//! A sub-flow is a bounded interactive task launched by the session:
//! grid picking, camera capture, cropping, or a full-size preview. Each
//! terminates with a [`FlowOutcome`]: completed with a payload, cancelled, or
//! failed.
//!
//! Controllers never touch the selection registry. They turn a request into
//! whatever the external collaborator needs and vet the collaborator's answer;
//! the session decides how the payload merges.
//!
//! # Architecture
//!
//! ```text
//! SelectionSession ──request──▶ CaptureFlow / CropFlow / PreviewFlow ──▶ collaborator
//!        ▲                                                                │
//!        └──────────────────── finish(FlowOutcome) ◀──────────────────────┘
//! ```
//!
//! - `traits`: collaborator traits and the request types handed to them
//! - `picking`, `capture`, `crop`, `preview`: the controllers
//! - `mock`: collaborators with predetermined answers

mod capture;
mod crop;
mod error;
mod picking;
mod preview;
mod traits;

pub mod mock;

pub use capture::CaptureFlow;
pub use crop::CropFlow;
pub use error::FlowError;
pub use picking::{ALL_FOLDER, Folder, PickedBatch, PickingFlow};
pub use preview::{PreviewFlow, PreviewResult, PreviewScope, VettedPreview};
pub use traits::{
    CaptureDevice, CaptureRequest, CropRequest, CropService, MediaSource, PreviewRequest,
    Previewer,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which sub-flow an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Picking,
    Capture,
    Crop,
    Preview,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Picking => "picking",
            Self::Capture => "capture",
            Self::Crop => "crop",
            Self::Preview => "preview",
        };
        f.write_str(name)
    }
}

/// How a sub-flow ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome<T> {
    /// The user finished the task
    Completed(T),
    /// The user backed out
    Cancelled,
    /// The collaborator could not finish
    Failed(String),
}

impl<T> FlowOutcome<T> {
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Transform the payload, keeping cancellations and failures
    pub fn map<U, F>(self, f: F) -> FlowOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Completed(value) => FlowOutcome::Completed(f(value)),
            Self::Cancelled => FlowOutcome::Cancelled,
            Self::Failed(reason) => FlowOutcome::Failed(reason),
        }
    }

    /// Chain a check that may turn a completion into a failure
    pub fn and_then<U, F>(self, f: F) -> FlowOutcome<U>
    where
        F: FnOnce(T) -> FlowOutcome<U>,
    {
        match self {
            Self::Completed(value) => f(value),
            Self::Cancelled => FlowOutcome::Cancelled,
            Self::Failed(reason) => FlowOutcome::Failed(reason),
        }
    }
}

impl<T> From<Result<T, FlowError>> for FlowOutcome<T> {
    fn from(result: Result<T, FlowError>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(FlowError::Cancelled) => Self::Cancelled,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}
