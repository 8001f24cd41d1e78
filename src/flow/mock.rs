//! Collaborators with predetermined answers
//!
//! Useful for testing without a device, and used by the demo binary in place
//! of a real camera and cropper.

use super::error::FlowError;
use super::preview::PreviewResult;
use super::traits::{
    CaptureDevice, CaptureRequest, CropRequest, CropService, MediaSource, PreviewRequest,
    Previewer,
};
use super::FlowOutcome;
use crate::media::{MediaFilter, MediaItem, MediaMeta};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Media source serving a fixed list
#[derive(Debug, Clone, Default)]
pub struct MockMediaSource {
    /// Items served on every load
    pub items: Vec<MediaItem>,
    /// Fail every load with this message
    pub failure: Option<String>,
}

impl MockMediaSource {
    #[must_use]
    pub const fn new(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            failure: None,
        }
    }

    /// Source whose every query fails
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            failure: Some(reason.into()),
        }
    }
}

impl MediaSource for MockMediaSource {
    fn load(&self, filter: &MediaFilter) -> Result<Vec<MediaItem>, FlowError> {
        if let Some(reason) = &self.failure {
            return Err(FlowError::Query(reason.clone()));
        }

        Ok(self
            .items
            .iter()
            .filter(|item| filter.accepts(item.kind()))
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
enum CaptureBehavior {
    Fixed(FlowOutcome<MediaItem>),
    Timestamped(AtomicUsize),
}

/// Camera stand-in
#[derive(Debug)]
pub struct MockCaptureDevice {
    behavior: CaptureBehavior,
}

impl MockCaptureDevice {
    /// Always "take" this item
    #[must_use]
    pub const fn returning(item: MediaItem) -> Self {
        Self {
            behavior: CaptureBehavior::Fixed(FlowOutcome::Completed(item)),
        }
    }

    /// Simulate the user leaving the camera UI
    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            behavior: CaptureBehavior::Fixed(FlowOutcome::Cancelled),
        }
    }

    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            behavior: CaptureBehavior::Fixed(FlowOutcome::failed(reason)),
        }
    }

    /// Produce a new image per capture, named after the current time and
    /// placed in the requested output directory
    #[must_use]
    pub const fn timestamped() -> Self {
        Self {
            behavior: CaptureBehavior::Timestamped(AtomicUsize::new(0)),
        }
    }
}

impl CaptureDevice for MockCaptureDevice {
    fn capture(&self, request: &CaptureRequest) -> FlowOutcome<MediaItem> {
        match &self.behavior {
            CaptureBehavior::Fixed(outcome) => outcome.clone(),
            CaptureBehavior::Timestamped(counter) => {
                let now = Utc::now();
                let seq = counter.fetch_add(1, Ordering::Relaxed);
                let name = format!("IMG_{}_{seq}.jpg", now.format("%Y%m%d_%H%M%S%3f"));
                let locator = request.config.output().directory.join(name);

                FlowOutcome::Completed(MediaItem::image(locator.to_string_lossy().into_owned()).with_meta(
                    MediaMeta {
                        mime_type: Some("image/jpeg".into()),
                        date_added: Some(now),
                        ..MediaMeta::default()
                    },
                ))
            }
        }
    }
}

/// Cropper stand-in
#[derive(Debug, Clone)]
pub struct MockCropService {
    outcome: Option<FlowOutcome<MediaItem>>,
}

impl MockCropService {
    /// Derive the result from the source: `a.jpg` becomes `a_crop_WxH.jpg`
    #[must_use]
    pub const fn derived() -> Self {
        Self { outcome: None }
    }

    #[must_use]
    pub const fn returning(item: MediaItem) -> Self {
        Self {
            outcome: Some(FlowOutcome::Completed(item)),
        }
    }

    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            outcome: Some(FlowOutcome::Cancelled),
        }
    }

    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Some(FlowOutcome::failed(reason)),
        }
    }
}

impl CropService for MockCropService {
    fn crop(&self, request: &CropRequest) -> FlowOutcome<MediaItem> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        let source = request.source.locator().as_str();
        let (stem, ext) = source.rsplit_once('.').unwrap_or((source, "jpg"));
        let locator = format!(
            "{stem}_crop_{}x{}.{ext}",
            request.config.width(),
            request.config.height()
        );

        let mut cropped = MediaItem::image(locator);
        if let Some(thumbnail) = request.source.thumbnail() {
            cropped = cropped.with_thumbnail(thumbnail.clone());
        }
        FlowOutcome::Completed(cropped)
    }
}

#[derive(Debug, Clone)]
enum PreviewBehavior {
    Fixed(FlowOutcome<PreviewResult>),
    Keep { confirm: bool },
}

/// Previewer stand-in
#[derive(Debug, Clone)]
pub struct MockPreviewer {
    behavior: PreviewBehavior,
}

impl MockPreviewer {
    /// Hand back the selection the preview opened with
    #[must_use]
    pub const fn keeping(confirm: bool) -> Self {
        Self {
            behavior: PreviewBehavior::Keep { confirm },
        }
    }

    /// Hand back this result whatever was shown
    #[must_use]
    pub const fn returning(result: PreviewResult) -> Self {
        Self {
            behavior: PreviewBehavior::Fixed(FlowOutcome::Completed(result)),
        }
    }

    #[must_use]
    pub const fn cancelled() -> Self {
        Self {
            behavior: PreviewBehavior::Fixed(FlowOutcome::Cancelled),
        }
    }

    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            behavior: PreviewBehavior::Fixed(FlowOutcome::failed(reason)),
        }
    }
}

impl Previewer for MockPreviewer {
    fn preview(&self, request: &PreviewRequest) -> FlowOutcome<PreviewResult> {
        match &self.behavior {
            PreviewBehavior::Fixed(outcome) => outcome.clone(),
            PreviewBehavior::Keep { confirm } => FlowOutcome::Completed(PreviewResult {
                confirm: *confirm,
                selection: request.selection.clone(),
            }),
        }
    }
}
