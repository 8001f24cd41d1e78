//! Camera capture controller

use super::traits::{CaptureDevice, CaptureRequest};
use super::FlowOutcome;
use crate::config::{CaptureConfig, InvalidConfig, PickerConfig};
use crate::media::{MediaItem, MediaKind};
use tracing::debug;

/// One capture round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFlow {
    config: CaptureConfig,
}

impl CaptureFlow {
    /// Prepare a capture for the given session config
    ///
    /// Video recording follows the picker's `pick_video` toggle, whatever the
    /// embedded capture config says. Returns `None` when the picker has no
    /// capture config.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] if the adjusted capture config fails to build.
    pub fn for_picker(picker: &PickerConfig) -> Result<Option<Self>, InvalidConfig> {
        picker
            .capture()
            .map(|capture| {
                capture
                    .rebuild()
                    .video_record(picker.pick_video())
                    .build()
                    .map(|config| Self { config })
            })
            .transpose()
    }

    #[must_use]
    pub const fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Request to hand to the capture device
    #[must_use]
    pub fn request(&self) -> CaptureRequest {
        CaptureRequest {
            config: self.config.clone(),
        }
    }

    /// Vet the device's answer
    ///
    /// A camera produces stills, or videos when recording is enabled.
    /// Anything else is reported as a failure.
    #[must_use]
    pub fn finish(&self, outcome: FlowOutcome<MediaItem>) -> FlowOutcome<MediaItem> {
        outcome.and_then(|item| match item.kind() {
            MediaKind::Image => FlowOutcome::Completed(item),
            MediaKind::Video if self.config.video_record() => FlowOutcome::Completed(item),
            kind => FlowOutcome::failed(format!(
                "camera returned a {kind} but only {} are allowed",
                if self.config.video_record() {
                    "images and videos"
                } else {
                    "images"
                }
            )),
        })
    }

    /// Request, run the device and vet its answer in one go
    pub fn run(&self, device: &dyn CaptureDevice) -> FlowOutcome<MediaItem> {
        let outcome = device.capture(&self.request());
        debug!(target = "mediapick.flow", completed = outcome.is_completed(), "capture returned");
        self.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::mock::MockCaptureDevice;
    use crate::testing::{gif, image, video};

    fn picker(pick_video: bool, video_record: bool) -> PickerConfig {
        PickerConfig::builder()
            .pick_video(pick_video)
            .capture(Some(
                CaptureConfig::builder()
                    .video_record(video_record)
                    .quality(70)
                    .build()
                    .unwrap(),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_capture_config_yields_none() {
        let config = PickerConfig::builder().build().unwrap();
        assert!(CaptureFlow::for_picker(&config).unwrap().is_none());
    }

    #[test]
    fn test_video_record_follows_pick_video() {
        let flow = CaptureFlow::for_picker(&picker(true, false)).unwrap().unwrap();
        assert!(flow.config().video_record());
        assert_eq!(flow.config().quality(), 70);

        let flow = CaptureFlow::for_picker(&picker(false, true)).unwrap().unwrap();
        assert!(!flow.request().config.video_record());
    }

    #[test]
    fn test_video_rejected_without_recording() {
        let flow = CaptureFlow::for_picker(&picker(false, false)).unwrap().unwrap();

        assert!(matches!(
            flow.finish(FlowOutcome::Completed(video("clip"))),
            FlowOutcome::Failed(_)
        ));
        assert!(matches!(
            flow.finish(FlowOutcome::Completed(gif("anim"))),
            FlowOutcome::Failed(_)
        ));
        assert_eq!(
            flow.finish(FlowOutcome::Completed(image("shot"))),
            FlowOutcome::Completed(image("shot"))
        );
    }

    #[test]
    fn test_video_accepted_with_recording() {
        let flow = CaptureFlow::for_picker(&picker(true, false)).unwrap().unwrap();

        assert!(flow.finish(FlowOutcome::Completed(video("clip"))).is_completed());
    }

    #[test]
    fn test_run_passes_cancellation_through() {
        let flow = CaptureFlow::for_picker(&picker(false, false)).unwrap().unwrap();

        assert_eq!(flow.run(&MockCaptureDevice::cancelled()), FlowOutcome::Cancelled);
        assert_eq!(
            flow.run(&MockCaptureDevice::returning(image("shot"))),
            FlowOutcome::Completed(image("shot"))
        );
    }
}
