//! Crop controller

use super::traits::{CropRequest, CropService};
use super::FlowOutcome;
use crate::config::CropConfig;
use crate::media::MediaItem;
use tracing::debug;

/// One crop round trip on the selected item at `index`
///
/// The payload is understood to supersede the source item in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropFlow {
    config: CropConfig,
    source: MediaItem,
    index: usize,
}

impl CropFlow {
    #[must_use]
    pub const fn new(config: CropConfig, source: MediaItem, index: usize) -> Self {
        Self {
            config,
            source,
            index,
        }
    }

    #[must_use]
    pub const fn source(&self) -> &MediaItem {
        &self.source
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn request(&self) -> CropRequest {
        CropRequest {
            config: self.config.clone(),
            source: self.source.clone(),
            index: self.index,
        }
    }

    /// Vet the cropper's answer: a crop always yields a still image
    #[must_use]
    pub fn finish(&self, outcome: FlowOutcome<MediaItem>) -> FlowOutcome<MediaItem> {
        outcome.and_then(|item| {
            if item.is_image() {
                FlowOutcome::Completed(item)
            } else {
                FlowOutcome::failed(format!("cropper returned a {}, expected an image", item.kind()))
            }
        })
    }

    /// Request, run the cropper and vet its answer in one go
    pub fn run(&self, service: &dyn CropService) -> FlowOutcome<MediaItem> {
        let outcome = service.crop(&self.request());
        debug!(
            target = "mediapick.flow",
            source = %self.source.locator(),
            completed = outcome.is_completed(),
            "crop returned"
        );
        self.finish(outcome)
    }
}
