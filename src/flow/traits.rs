//! Collaborator traits
//!
//! These abstract the pieces the session drives but does not own: the
//! device media index, the camera, the cropper and the full-size previewer.
//! Hosts implement them over their platform; tests and the demo binary use
//! [`super::mock`].

use super::error::FlowError;
use super::preview::PreviewResult;
use super::FlowOutcome;
use crate::config::{CaptureConfig, CropConfig};
use crate::media::{MediaFilter, MediaItem};
use serde::{Deserialize, Serialize};

/// What the capture device is asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Capture settings, already adjusted for the session (video recording)
    pub config: CaptureConfig,
}

/// What the crop service is asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRequest {
    pub config: CropConfig,
    /// Item being cropped
    pub source: MediaItem,
    /// Position of `source` in the selection
    pub index: usize,
}

/// What the previewer is asked to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Items to page through
    pub items: Vec<MediaItem>,
    /// Index in `items` shown first
    pub position: usize,
    /// Selection when the preview opened
    pub selection: Vec<MediaItem>,
    /// Most items the user may leave checked
    pub threshold: usize,
}

/// Source of candidate items for the picking grid
pub trait MediaSource {
    /// Load every candidate that passes `filter`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the media index cannot be queried.
    fn load(&self, filter: &MediaFilter) -> Result<Vec<MediaItem>, FlowError>;
}

/// Camera capture collaborator
pub trait CaptureDevice {
    /// Take exactly one picture or video, or report cancellation
    fn capture(&self, request: &CaptureRequest) -> FlowOutcome<MediaItem>;
}

/// Crop collaborator
pub trait CropService {
    /// Produce the cropped replacement for `request.source`
    fn crop(&self, request: &CropRequest) -> FlowOutcome<MediaItem>;
}

/// Full-size preview collaborator
pub trait Previewer {
    /// Let the user page through `request.items` and edit the selection
    fn preview(&self, request: &PreviewRequest) -> FlowOutcome<PreviewResult>;
}
