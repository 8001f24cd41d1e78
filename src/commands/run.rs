//! Run command - play a scripted selection session
//!
//! The camera, cropper and previewer are stand-ins: captures produce
//! timestamped images in the configured camera directory, crops derive their
//! name from the source item, and a preview hands the selection back as it
//! found it.

use crate::cli::{RunArgs, Step};
use crate::config::{PickerConfig, PickerSettings};
use crate::flow::mock::{MockCaptureDevice, MockCropService, MockMediaSource, MockPreviewer};
use crate::flow::{
    CaptureDevice, CropService, FlowOutcome, PreviewResult, PreviewScope, Previewer,
};
use crate::media::{Locator, MediaItem};
use crate::output::{self, OutputWriter};
use crate::session::{
    self, SelectionOutcome, SelectionSession, SessionNotice, SessionSnapshot, SessionState,
    SessionStore,
};
use crate::MediapickError;
use serde::Serialize;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, MediapickError>;

/// What happened during a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub state: SessionState,
    pub notices: Vec<SessionNotice>,
    /// Rejected steps, in order
    pub errors: Vec<String>,
    /// Missing when the session was suspended
    pub outcome: Option<SelectionOutcome>,
    pub suspended_as: Option<String>,
}

enum Played {
    Notice(SessionNotice),
    Opened(String),
    Suspended(Box<SessionSnapshot>),
}

/// Execute the run command
///
/// Rejected steps are reported and skipped. A script that neither confirms,
/// aborts nor suspends is aborted at the end.
///
/// # Errors
///
/// Returns `MediapickError` if the config is invalid, a resumed session
/// cannot be found or restored, or the store fails.
pub fn execute(
    args: &RunArgs,
    settings: &PickerSettings,
    store: &SessionStore,
    output: &dyn OutputWriter,
    quiet: bool,
) -> Result<RunSummary> {
    let mut session = SelectionSession::new();
    let mut receiver = session.subscribe()?;

    let first = match &args.resume {
        Some(name) => {
            let snapshot = store
                .load(name)?
                .ok_or_else(|| MediapickError::SessionNotFound(name.clone()))?;
            session.restore(snapshot)?
        }
        None => session.start(build_config(args, settings)?)?,
    };

    let mut summary = RunSummary {
        state: session.state().clone(),
        notices: Vec::new(),
        errors: Vec::new(),
        outcome: None,
        suspended_as: None,
    };
    record(&mut summary, output, first);

    if !args.library.is_empty() && session.state() == &SessionState::Picking {
        let source = MockMediaSource::new(infer_all(&args.library));
        let notice = session.load_candidates(&source)?;
        record(&mut summary, output, notice);
    }

    let camera = MockCaptureDevice::timestamped();
    let cropper = MockCropService::derived();
    let previewer = MockPreviewer::keeping(false);

    for step in &args.steps {
        debug!(target = "mediapick.run", %step, state = %session.state(), "step");

        match play(&mut session, step, &camera, &cropper, &previewer) {
            Ok(Played::Notice(notice)) => record(&mut summary, output, notice),
            Ok(Played::Opened(message)) => output.info(&message),
            Ok(Played::Suspended(snapshot)) => {
                store.save(&args.name, &snapshot)?;
                info!(target = "mediapick.run", name = %args.name, state = %snapshot.state, "session saved");
                output.success(&format!("Session saved as '{}'", args.name));
                summary.suspended_as = Some(args.name.clone());
            }
            Err(e) => {
                output.error(&format!("{step}: {e}"));
                summary.errors.push(format!("{step}: {e}"));
                if session.is_terminal() {
                    break;
                }
            }
        }

        if summary.suspended_as.is_some() {
            break;
        }
    }

    if summary.suspended_as.is_none() && !session.is_terminal() {
        output.warning("Script ended without confirm or abort");
        let notice = session.abort()?;
        record(&mut summary, output, notice);
    }

    if session.is_terminal() {
        if let Some(name) = &args.resume {
            store.remove(name)?;
        }
    }

    summary.state = session.state().clone();
    summary.outcome = receiver.try_recv();

    if let Some(outcome) = &summary.outcome {
        output::report_outcome(output, outcome, quiet);
    } else if !quiet {
        output.info(&session.ensure_label());
    }

    Ok(summary)
}

/// Settings-derived config with the run's flag overrides applied
///
/// # Errors
///
/// Returns `MediapickError::InvalidConfig` if the result does not validate.
pub fn build_config(args: &RunArgs, settings: &PickerSettings) -> Result<PickerConfig> {
    let mut overrides = args.overrides();
    if !args.picked.is_empty() {
        overrides.picked = Some(infer_all(&args.picked));
    }

    Ok(settings.to_builder()?.overrides(overrides).build()?)
}

fn record(summary: &mut RunSummary, output: &dyn OutputWriter, notice: SessionNotice) {
    output::report_notice(output, &notice);
    summary.notices.push(notice);
}

fn infer_all(locators: &[String]) -> Vec<MediaItem> {
    locators.iter().map(|l| MediaItem::infer(l)).collect()
}

/// Selection preview, or the grid from a 1-based position
const fn scope(position: Option<usize>) -> PreviewScope {
    match position {
        Some(position) => PreviewScope::Grid {
            position: position.saturating_sub(1),
        },
        None => PreviewScope::Selection,
    }
}

fn play(
    session: &mut SelectionSession,
    step: &Step,
    camera: &dyn CaptureDevice,
    cropper: &dyn CropService,
    previewer: &dyn Previewer,
) -> session::Result<Played> {
    let notice = match step {
        Step::Pick(locators) => {
            session.apply_picks(FlowOutcome::Completed(infer_all(locators)))?
        }
        Step::Check(locator) => session.check(MediaItem::infer(locator))?,
        Step::Uncheck(locator) => session.uncheck(&Locator::new(locator.as_str()))?,
        Step::Folder(index) => session.check_folder(*index)?,
        Step::Capture => session.run_capture(camera)?,
        Step::CancelCapture => session.run_capture(&MockCaptureDevice::cancelled())?,
        Step::OpenCapture => {
            let request = session.request_capture()?;
            return Ok(Played::Opened(format!(
                "Camera open (quality {}, saving to {})",
                request.config.quality(),
                request.config.output().directory.display()
            )));
        }
        Step::Captured(locator) => {
            session.complete_capture(FlowOutcome::Completed(MediaItem::infer(locator)))?
        }
        Step::Crop(position) => session.run_crop(position - 1, cropper)?,
        Step::CancelCrop(position) => {
            session.run_crop(position - 1, &MockCropService::cancelled())?
        }
        Step::OpenCrop(position) => {
            let request = session.request_crop(position - 1)?;
            return Ok(Played::Opened(format!(
                "Cropper open on {} ({}x{})",
                request.source.locator(),
                request.config.width(),
                request.config.height()
            )));
        }
        Step::Cropped(locator) => {
            session.complete_crop(FlowOutcome::Completed(MediaItem::infer(locator)))?
        }
        Step::Preview(position) => session.run_preview(scope(*position), previewer)?,
        Step::CancelPreview => {
            session.run_preview(PreviewScope::Selection, &MockPreviewer::cancelled())?
        }
        Step::OpenPreview(position) => {
            let request = session.request_preview(scope(*position))?;
            let shown = request
                .items
                .get(request.position)
                .map(|item| item.locator().to_string())
                .unwrap_or_default();
            return Ok(Played::Opened(format!(
                "Preview open on {shown} ({} of {}, {} selected)",
                request.position + 1,
                request.items.len(),
                request.selection.len()
            )));
        }
        Step::Previewed(locators) => session.complete_preview(FlowOutcome::Completed(
            PreviewResult::kept(infer_all(locators)),
        ))?,
        Step::PreviewConfirmed(locators) => session.complete_preview(FlowOutcome::Completed(
            PreviewResult::confirmed(infer_all(locators)),
        ))?,
        Step::Back => session.back()?,
        Step::Confirm => session.confirm()?,
        Step::Abort => session.abort()?,
        Step::Suspend => return Ok(Played::Suspended(Box::new(session.suspend()?))),
    };
    Ok(Played::Notice(notice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BufferedWriter, MessageLevel};
    use crate::testing::TestStore;

    fn args(steps: &[&str]) -> RunArgs {
        RunArgs {
            steps: steps.iter().map(|s| s.parse().unwrap()).collect(),
            name: "default".into(),
            ..RunArgs::default()
        }
    }

    fn settings() -> PickerSettings {
        let mut settings = PickerSettings::default();
        settings.camera.enabled = true;
        settings.crop.enabled = true;
        settings
    }

    fn run(args: &RunArgs, store: &TestStore) -> (RunSummary, BufferedWriter) {
        let output = BufferedWriter::new();
        let summary = execute(args, &settings(), store.store(), &output, true).unwrap();
        (summary, output)
    }

    #[test]
    fn test_pick_crop_confirm() {
        let store = TestStore::new();
        let mut args = args(&["pick:a.jpg,b.jpg", "crop:2", "confirm"]);
        args.threshold = Some(3);

        let (summary, output) = run(&args, &store);

        assert_eq!(summary.state, SessionState::Resolved);
        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![
                MediaItem::image("a.jpg"),
                MediaItem::image("b_crop_500x500.jpg"),
            ]))
        );
        assert_eq!(
            output.at(MessageLevel::Normal),
            vec!["a.jpg", "b_crop_500x500.jpg"]
        );
    }

    #[test]
    fn test_unfinished_script_is_aborted() {
        let store = TestStore::new();

        let (summary, _) = run(&args(&["check:a.jpg"]), &store);

        assert_eq!(summary.outcome, Some(SelectionOutcome::Cancelled));
        assert_eq!(summary.notices.last(), Some(&SessionNotice::Cancelled));
    }

    #[test]
    fn test_rejected_steps_are_reported_and_skipped() {
        let store = TestStore::new();
        let mut args = args(&["open-capture", "abort", "confirm", "check:a.jpg"]);
        args.no_capture = true;

        let (summary, output) = run(&args, &store);

        assert_eq!(summary.errors.len(), 2);
        assert!(summary.errors[0].starts_with("open-capture"));
        assert!(summary.errors[1].starts_with("confirm"));
        assert_eq!(output.at(MessageLevel::Error).len(), 2);
        assert_eq!(summary.state, SessionState::Cancelled);
    }

    #[test]
    fn test_suspend_then_resume() {
        let store = TestStore::new();
        let mut first = args(&["check:a.jpg", "open-crop:1", "suspend", "confirm"]);
        first.name = "trip".into();

        let (summary, _) = run(&first, &store);

        assert_eq!(summary.suspended_as.as_deref(), Some("trip"));
        assert_eq!(summary.outcome, None);
        assert!(matches!(summary.state, SessionState::CropPending { index: 0, .. }));

        let mut second = args(&["cropped:a_small.jpg", "confirm"]);
        second.resume = Some("trip".into());

        let (summary, _) = run(&second, &store);

        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![MediaItem::image("a_small.jpg")]))
        );
        assert!(store.store().load("trip").unwrap().is_none());
    }

    #[test]
    fn test_resume_missing_session() {
        let store = TestStore::new();
        let mut args = args(&[]);
        args.resume = Some("ghost".into());

        let output = BufferedWriter::new();
        let result = execute(&args, &settings(), store.store(), &output, true);

        assert!(matches!(result, Err(MediapickError::SessionNotFound(name)) if name == "ghost"));
    }

    #[test]
    fn test_build_config_applies_flags() {
        let mut args = args(&[]);
        args.threshold = Some(2);
        args.picked = vec!["a.jpg".into(), "a.jpg".into(), "b.mp4".into()];
        args.no_crop = true;

        let config = build_config(&args, &settings()).unwrap();

        assert_eq!(config.threshold(), 2);
        assert_eq!(config.picked().len(), 2);
        assert!(!config.supports_crop());
    }

    #[test]
    fn test_invalid_flags_fail_before_start() {
        let mut args = args(&[]);
        args.threshold = Some(0);

        assert!(matches!(
            build_config(&args, &PickerSettings::default()),
            Err(MediapickError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_capture_lands_in_camera_directory() {
        let store = TestStore::new();

        let (summary, _) = run(&args(&["capture", "confirm"]), &store);

        let Some(SelectionOutcome::Selected(items)) = summary.outcome else {
            panic!("Expected a selection");
        };
        assert_eq!(items.len(), 1);
        assert!(items[0].locator().as_str().starts_with("DCIM"));
    }

    #[test]
    fn test_confirm_with_nothing_selected_keeps_going() {
        let store = TestStore::new();

        let (summary, output) = run(&args(&["confirm", "check:a.jpg", "confirm"]), &store);

        assert!(summary.notices.contains(&SessionNotice::NothingSelected));
        assert!(summary.errors.is_empty());
        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![MediaItem::image("a.jpg")]))
        );
        assert_eq!(output.at(MessageLevel::Warning).len(), 1);
    }

    #[test]
    fn test_disallowed_seeds_rejected_at_start() {
        let store = TestStore::new();
        let mut args = args(&["confirm"]);
        args.picked = vec!["a.jpg".into(), "b.mp4".into()];

        let (summary, _) = run(&args, &store);

        assert_eq!(
            summary.notices[0],
            SessionNotice::Started {
                seeded: 1,
                rejected: 1
            }
        );
        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![MediaItem::image("a.jpg")]))
        );
    }

    #[test]
    fn test_preview_steps() {
        let store = TestStore::new();
        let mut args = args(&[
            "check:a.jpg",
            "open-preview:2",
            "previewed:a.jpg,b.jpg",
            "preview",
            "cancel-preview",
            "confirm",
        ]);
        args.library = vec!["a.jpg".into(), "b.jpg".into()];

        let (summary, output) = run(&args, &store);

        assert!(summary.errors.is_empty());
        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![
                MediaItem::image("a.jpg"),
                MediaItem::image("b.jpg"),
            ]))
        );
        assert!(output
            .at(MessageLevel::Info)
            .iter()
            .any(|line| line.starts_with("Preview open on b.jpg (2 of 2, 1 selected)")));
    }

    #[test]
    fn test_confirm_from_preview_step() {
        let store = TestStore::new();

        let (summary, _) = run(
            &args(&["check:a.jpg", "check:b.jpg", "open-preview", "preview-confirm:b.jpg"]),
            &store,
        );

        assert_eq!(summary.state, SessionState::Resolved);
        assert_eq!(
            summary.outcome,
            Some(SelectionOutcome::Selected(vec![MediaItem::image("b.jpg")]))
        );
    }

    #[test]
    fn test_folder_steps() {
        let store = TestStore::new();
        let mut args = args(&["folder:2", "folder:7", "abort"]);
        args.library = vec!["DCIM/Camera/1.jpg".into(), "Pictures/2.jpg".into()];

        let (summary, _) = run(&args, &store);

        assert!(summary.notices.contains(&SessionNotice::FolderShown {
            index: 2,
            name: "Pictures".into(),
            count: 1,
        }));
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("folder:7"));
    }
}
