//! Selection session orchestration
//!
//! A [`SelectionSession`] owns the selection registry, the retained picking
//! state and the result channel, and moves through the states described by
//! [`SessionState`]. The presentation layer drives it with intents
//! (`check`, `request_capture`, `confirm`, ...) and the host feeds sub-flow
//! outcomes back with `complete_*`. Nothing else mutates the registry.
//!
//! # Workflow
//!
//! ```text
//! SelectionSession::new()
//!     ↓
//! on_result(cb) / subscribe()      (any time, once)
//!     ↓
//! start(config) → Picking
//!     ↓
//! ┌─→ intent?
//! │   ├─ apply_picks / check / uncheck / check_folder → notice
//! │   ├─ request_capture → CapturePending → complete_capture → merge ─┐
//! │   ├─ request_crop(i) → CropPending    → complete_crop    → merge ─┤
//! │   ├─ request_preview → PreviewPending → complete_preview → merge ─┤
//! │   ├─ confirm → Resolved  (fires Selected; refused while empty)    │
//! │   └─ abort   → Cancelled (fires Cancelled)                        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every intent returns a [`SessionNotice`] on success. Threshold overflows,
//! duplicates and sub-flow failures are notices, not errors. Only a
//! reference to a selection slot that does not exist is fatal.

mod error;
mod result;
mod state;
mod store;

pub use error::{Result, SessionError};
pub use result::{ResultReceiver, SelectionOutcome};
pub use state::SessionState;
pub use store::{SessionStore, StoreError};

use crate::config::PickerConfig;
use crate::flow::{
    CaptureDevice, CaptureFlow, CaptureRequest, CropFlow, CropRequest, CropService, FlowKind,
    FlowOutcome, Folder, MediaSource, PickingFlow, PreviewFlow, PreviewRequest, PreviewResult,
    PreviewScope, Previewer, VettedPreview,
};
use crate::media::{Locator, MediaItem, MediaKind};
use crate::registry::{RegistryError, SelectionRegistry};
use chrono::{DateTime, Utc};
use result::ResultChannel;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Snapshot layout version; bumped when the encoding changes
pub const SNAPSHOT_VERSION: u32 = 2;

/// Counts from merging one picking pass into the selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Newly selected items
    pub added: usize,
    /// Items that were already selected
    pub duplicates: usize,
    /// Items that did not fit under the threshold
    pub dropped: usize,
    /// Items whose kind is not allowed
    pub rejected: usize,
}

/// Non-fatal report returned by a successful intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionNotice {
    /// Session is picking, with `seeded` items pre-selected and `rejected`
    /// seeds dropped for their kind
    Started { seeded: usize, rejected: usize },
    /// A suspended session was restored into this state
    Resumed(SessionState),
    CandidatesLoaded { count: usize, folders: usize },
    /// The grid now shows folder `index`
    FolderShown {
        index: usize,
        name: String,
        count: usize,
    },
    Merged(MergeReport),
    /// The preview's selection replaced the current one; `removed` items
    /// were unchecked in the preview
    Previewed { removed: usize, report: MergeReport },
    Added(Locator),
    Removed(Locator),
    NotSelected(Locator),
    AlreadySelected(Locator),
    /// The item did not fit and was dropped
    ThresholdReached { threshold: usize },
    KindNotAllowed(MediaKind),
    /// The crop result took the place of the source item
    Replaced {
        index: usize,
        previous: Locator,
        current: Locator,
    },
    SubFlowCancelled(FlowKind),
    SubFlowFailed { kind: FlowKind, reason: String },
    /// Confirm was refused because the selection is empty
    NothingSelected,
    Resolved { count: usize },
    Cancelled,
}

/// Serialized image of a non-terminal session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub config: PickerConfig,
    pub state: SessionState,
    pub selection: Vec<MediaItem>,
    pub picking: PickingFlow,
}

/// One media selection session
///
/// Owned by whoever created it. The selection is exposed only as snapshots.
#[derive(Debug)]
pub struct SelectionSession {
    state: SessionState,
    config: PickerConfig,
    registry: SelectionRegistry,
    picking: PickingFlow,
    channel: ResultChannel,
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSession {
    /// Create an idle session
    ///
    /// Until `start` is called the session carries the default config and an
    /// empty selection.
    #[must_use]
    pub fn new() -> Self {
        let config = PickerConfig::default();
        Self {
            state: SessionState::Idle,
            registry: SelectionRegistry::new(config.threshold()),
            picking: PickingFlow::new(config.media_filter()),
            config,
            channel: ResultChannel::default(),
        }
    }

    /// Restore a suspended session
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotResumable`] if the snapshot is terminal or
    /// inconsistent, or [`SessionError::Config`] if its config is invalid.
    pub fn resume(snapshot: SessionSnapshot) -> Result<Self> {
        let mut session = Self::new();
        session.restore(snapshot)?;
        Ok(session)
    }

    /// Register a callback for the final outcome
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ResultAlreadyRegistered`] on a second registration.
    pub fn on_result<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnOnce(SelectionOutcome) + Send + 'static,
    {
        self.channel.on_result(callback)
    }

    /// Obtain an awaitable receiver for the final outcome
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ResultAlreadyRegistered`] on a second registration.
    pub fn subscribe(&mut self) -> Result<ResultReceiver> {
        self.channel.subscribe()
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    /// Current selection, in order
    #[must_use]
    pub fn selection(&self) -> Vec<MediaItem> {
        self.registry.snapshot()
    }

    #[must_use]
    pub fn selected_len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_selected(&self, locator: &Locator) -> bool {
        self.registry.contains(locator)
    }

    /// Items currently shown in the grid
    #[must_use]
    pub fn candidates(&self) -> &[MediaItem] {
        self.picking.candidates()
    }

    /// Candidate folders, the all-media folder first
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        self.picking.folders()
    }

    /// Index of the folder the grid shows
    #[must_use]
    pub const fn checked_folder(&self) -> usize {
        self.picking.checked_folder()
    }

    /// Confirm button label, e.g. `Confirm (2/9)`
    #[must_use]
    pub fn ensure_label(&self) -> String {
        format!(
            "Confirm ({}/{})",
            self.registry.len(),
            self.registry.threshold()
        )
    }

    /// Whether confirming now would resolve the session
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.state == SessionState::Picking && !self.registry.is_empty()
    }

    /// Whether the selection can be opened in the previewer
    #[must_use]
    pub fn can_preview(&self) -> bool {
        self.can_confirm()
    }

    /// Whether a capture could currently add an item
    #[must_use]
    pub fn can_capture(&self) -> bool {
        self.state == SessionState::Picking
            && self.config.supports_capture()
            && !self.registry.is_full()
    }

    /// Whether the selected item at `index` can be cropped now
    #[must_use]
    pub fn can_crop(&self, index: usize) -> bool {
        self.state == SessionState::Picking
            && self.config.supports_crop()
            && self.registry.get(index).is_some_and(MediaItem::is_image)
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    // ---------------------------------------------------------------------
    // Lifecycle intents
    // ---------------------------------------------------------------------

    /// Start picking with the given config
    ///
    /// The selection is seeded from `config.picked()`. Seeds go through the
    /// same media filter as grid picks, so a video seed is dropped unless
    /// videos may be picked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless idle, `Terminated` once finished,
    /// or `Config` if the config does not validate.
    pub fn start(&mut self, config: PickerConfig) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Idle, "start")?;
        config.validate()?;

        let picking = PickingFlow::new(config.media_filter());
        let seeds = picking.accept(config.picked().to_vec());
        if seeds.rejected > 0 {
            warn!(
                target = "mediapick.session",
                rejected = seeds.rejected,
                "seeded items of a disallowed kind dropped"
            );
        }

        self.registry = SelectionRegistry::with_items(config.threshold(), seeds.items)?;
        self.picking = picking;
        self.config = config;
        self.transition(SessionState::Picking);

        let seeded = self.registry.len();
        info!(
            target = "mediapick.session",
            threshold = self.config.threshold(),
            seeded,
            capture = self.config.supports_capture(),
            crop = self.config.supports_crop(),
            "session started"
        );
        Ok(SessionNotice::Started {
            seeded,
            rejected: seeds.rejected,
        })
    }

    /// Restore a snapshot into an idle session
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless idle, `NotResumable` for a terminal
    /// or inconsistent snapshot, `Config` for an invalid config.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Idle, "restore")?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SessionError::NotResumable(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.state.is_terminal() || snapshot.state == SessionState::Idle {
            return Err(SessionError::NotResumable(format!(
                "session was {}",
                snapshot.state
            )));
        }
        snapshot.config.validate()?;
        if !snapshot.picking.is_consistent() {
            return Err(SessionError::NotResumable(
                "grid shows a folder that does not exist".into(),
            ));
        }

        let expected = snapshot.selection.len();
        let registry = SelectionRegistry::with_items(snapshot.config.threshold(), snapshot.selection)
            .map_err(|e| SessionError::NotResumable(e.to_string()))?;
        if registry.len() != expected {
            return Err(SessionError::NotResumable(
                "selection holds duplicate items".into(),
            ));
        }

        match &snapshot.state {
            SessionState::CapturePending if !snapshot.config.supports_capture() => {
                return Err(SessionError::NotResumable(
                    "capture pending without a capture config".into(),
                ));
            }
            SessionState::CropPending { index, source } => {
                if !snapshot.config.supports_crop() {
                    return Err(SessionError::NotResumable(
                        "crop pending without a crop config".into(),
                    ));
                }
                if registry.get(*index).map(MediaItem::locator) != Some(source) {
                    return Err(SessionError::NotResumable(format!(
                        "crop source {source} is no longer at #{}",
                        index + 1
                    )));
                }
            }
            _ => {}
        }

        self.config = snapshot.config;
        self.registry = registry;
        self.picking = snapshot.picking;
        self.transition(snapshot.state.clone());

        info!(
            target = "mediapick.session",
            state = %snapshot.state,
            selected = self.registry.len(),
            saved_at = %snapshot.saved_at,
            "session resumed"
        );
        Ok(SessionNotice::Resumed(snapshot.state))
    }

    /// Capture the session so it can be resumed later
    ///
    /// # Errors
    ///
    /// Returns `Terminated` once finished, `InvalidTransition` before `start`.
    pub fn suspend(&self) -> Result<SessionSnapshot> {
        self.ensure_live("suspend")?;
        if self.state == SessionState::Idle {
            return Err(self.invalid("suspend"));
        }

        debug!(target = "mediapick.session", state = %self.state, "session suspended");
        Ok(SessionSnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            config: self.config.clone(),
            state: self.state.clone(),
            selection: self.registry.snapshot(),
            picking: self.picking.clone(),
        })
    }

    /// Finish with the current selection
    ///
    /// With nothing selected the session keeps picking and
    /// `NothingSelected` is returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn confirm(&mut self) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "confirm")?;

        if self.registry.is_empty() {
            debug!(target = "mediapick.session", "confirm with nothing selected");
            return Ok(SessionNotice::NothingSelected);
        }

        let selection = self.registry.snapshot();
        let count = selection.len();
        self.transition(SessionState::Resolved);
        self.channel.fire(SelectionOutcome::Selected(selection));

        info!(target = "mediapick.session", count, "selection confirmed");
        Ok(SessionNotice::Resolved { count })
    }

    /// Abandon the session; the result reports `Cancelled`
    ///
    /// # Errors
    ///
    /// Returns `Terminated` once finished.
    pub fn abort(&mut self) -> Result<SessionNotice> {
        self.ensure_live("abort")?;

        self.transition(SessionState::Cancelled);
        self.channel.fire(SelectionOutcome::Cancelled);

        info!(target = "mediapick.session", "session aborted");
        Ok(SessionNotice::Cancelled)
    }

    /// Back navigation
    ///
    /// Cancels the outstanding sub-flow if there is one, otherwise aborts.
    ///
    /// # Errors
    ///
    /// Returns `Terminated` once finished.
    pub fn back(&mut self) -> Result<SessionNotice> {
        match self.state {
            SessionState::CapturePending => self.complete_capture(FlowOutcome::Cancelled),
            SessionState::CropPending { .. } => self.complete_crop(FlowOutcome::Cancelled),
            SessionState::PreviewPending => self.complete_preview(FlowOutcome::Cancelled),
            _ => self.abort(),
        }
    }

    // ---------------------------------------------------------------------
    // Picking intents
    // ---------------------------------------------------------------------

    /// Fill the grid from a media source
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn load_candidates(&mut self, source: &dyn MediaSource) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "load candidates")?;

        Ok(match self.picking.load(source) {
            FlowOutcome::Completed(count) => SessionNotice::CandidatesLoaded {
                count,
                folders: self.picking.folders().len(),
            },
            FlowOutcome::Cancelled => SessionNotice::SubFlowCancelled(FlowKind::Picking),
            FlowOutcome::Failed(reason) => self.sub_flow_failed(FlowKind::Picking, reason),
        })
    }

    /// Merge a picking pass into the selection
    ///
    /// Items are added in order; already selected items are skipped and
    /// items past the threshold are dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn apply_picks(&mut self, outcome: FlowOutcome<Vec<MediaItem>>) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "apply picks")?;

        let batch = match outcome {
            FlowOutcome::Completed(items) => self.picking.accept(items),
            FlowOutcome::Cancelled => {
                debug!(target = "mediapick.session", "picking cancelled");
                return Ok(SessionNotice::SubFlowCancelled(FlowKind::Picking));
            }
            FlowOutcome::Failed(reason) => {
                return Ok(self.sub_flow_failed(FlowKind::Picking, reason));
            }
        };

        let mut report = MergeReport {
            rejected: batch.rejected,
            duplicates: batch.duplicates,
            ..MergeReport::default()
        };
        for item in batch.items {
            match self.registry.add(item) {
                Ok(()) => report.added += 1,
                Err(RegistryError::DuplicateItem(_)) => report.duplicates += 1,
                Err(RegistryError::ThresholdExceeded { .. }) => report.dropped += 1,
                Err(e @ RegistryError::IndexOutOfRange { .. }) => return Err(self.desync(e)),
            }
        }

        info!(
            target = "mediapick.session",
            added = report.added,
            duplicates = report.duplicates,
            dropped = report.dropped,
            rejected = report.rejected,
            selected = self.registry.len(),
            "picks merged"
        );
        Ok(SessionNotice::Merged(report))
    }

    /// Select one item, as when a grid cell is tapped
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn check(&mut self, item: MediaItem) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "check")?;

        if !self.picking.filter().accepts(item.kind()) {
            return Ok(SessionNotice::KindNotAllowed(item.kind()));
        }
        Ok(self.add_one(item))
    }

    /// Deselect an item; unselected items are left alone
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn uncheck(&mut self, locator: &Locator) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "uncheck")?;

        Ok(match self.registry.remove(locator) {
            Some(removed) => {
                debug!(target = "mediapick.session", locator = %removed.locator(), "deselected");
                SessionNotice::Removed(removed.locator().clone())
            }
            None => SessionNotice::NotSelected(locator.clone()),
        })
    }

    /// Show another candidate folder in the grid
    ///
    /// # Errors
    ///
    /// Returns `UnknownFolder` for an index past the folder list,
    /// `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn check_folder(&mut self, index: usize) -> Result<SessionNotice> {
        self.expect_state(&SessionState::Picking, "switch folder")?;

        let count = self.picking.folders().len();
        let folder = self
            .picking
            .check_folder(index)
            .ok_or(SessionError::UnknownFolder { index, count })?;

        debug!(target = "mediapick.session", index, name = folder.name(), "folder shown");
        Ok(SessionNotice::FolderShown {
            index,
            name: folder.name().to_string(),
            count: folder.len(),
        })
    }

    // ---------------------------------------------------------------------
    // Capture
    // ---------------------------------------------------------------------

    /// Launch the camera
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnsupported` without a capture config,
    /// `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn request_capture(&mut self) -> Result<CaptureRequest> {
        self.expect_state(&SessionState::Picking, "capture")?;

        let flow = self.capture_flow()?;
        self.transition(SessionState::CapturePending);
        Ok(flow.request())
    }

    /// Feed the camera's answer back
    ///
    /// A captured item goes to the front of the grid and is then selected.
    /// If the selection is full it is dropped with a `ThresholdReached`
    /// notice and the session keeps picking.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless a capture is pending,
    /// `Terminated` once finished.
    pub fn complete_capture(&mut self, outcome: FlowOutcome<MediaItem>) -> Result<SessionNotice> {
        self.expect_state(&SessionState::CapturePending, "complete capture")?;

        let flow = self.capture_flow()?;
        self.transition(SessionState::Picking);
        Ok(self.merge_capture(flow.finish(outcome)))
    }

    /// Request, run the device and complete in one call
    ///
    /// # Errors
    ///
    /// Same as [`request_capture`](Self::request_capture).
    pub fn run_capture(&mut self, device: &dyn CaptureDevice) -> Result<SessionNotice> {
        self.request_capture()?;
        let flow = self.capture_flow()?;
        let vetted = flow.run(device);
        self.transition(SessionState::Picking);
        Ok(self.merge_capture(vetted))
    }

    // ---------------------------------------------------------------------
    // Crop
    // ---------------------------------------------------------------------

    /// Launch the cropper on the selected item at `index`
    ///
    /// # Errors
    ///
    /// Returns `CropUnsupported` without a crop config, `CropRequiresImage`
    /// for GIFs and videos, `InvalidTransition` unless picking, `Terminated`
    /// once finished. An `index` past the selection is a desync: the session
    /// fails and `Desync` is returned.
    pub fn request_crop(&mut self, index: usize) -> Result<CropRequest> {
        self.expect_state(&SessionState::Picking, "crop")?;

        let flow = self.crop_flow(index)?;
        let source = flow.source();
        if !source.is_image() {
            return Err(SessionError::CropRequiresImage(
                source.locator().clone(),
                source.kind(),
            ));
        }

        let request = flow.request();
        self.transition(SessionState::CropPending {
            index,
            source: source.locator().clone(),
        });
        Ok(request)
    }

    /// Feed the cropper's answer back
    ///
    /// A cropped item replaces its source in place.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless a crop is pending, `Terminated`
    /// once finished, `Desync` if the source slot has gone.
    pub fn complete_crop(&mut self, outcome: FlowOutcome<MediaItem>) -> Result<SessionNotice> {
        let SessionState::CropPending { index, source } = self.state.clone() else {
            self.ensure_live("complete crop")?;
            return Err(self.invalid("complete crop"));
        };

        let flow = self.crop_flow(index)?;
        if flow.source().locator() != &source {
            let len = self.registry.len();
            return Err(self.desync(RegistryError::IndexOutOfRange { index, len }));
        }
        self.transition(SessionState::Picking);
        self.merge_crop(index, flow.finish(outcome))
    }

    /// Request, run the cropper and complete in one call
    ///
    /// # Errors
    ///
    /// Same as [`request_crop`](Self::request_crop).
    pub fn run_crop(&mut self, index: usize, service: &dyn CropService) -> Result<SessionNotice> {
        self.request_crop(index)?;
        let flow = self.crop_flow(index)?;
        let vetted = flow.run(service);
        self.transition(SessionState::Picking);
        self.merge_crop(index, vetted)
    }

    // ---------------------------------------------------------------------
    // Preview
    // ---------------------------------------------------------------------

    /// Open the full-size previewer
    ///
    /// # Errors
    ///
    /// Returns `NothingToPreview` for a selection preview with nothing
    /// selected, `NoSuchCandidate` for a grid position past the shown folder,
    /// `InvalidTransition` unless picking, `Terminated` once finished.
    pub fn request_preview(&mut self, scope: PreviewScope) -> Result<PreviewRequest> {
        self.expect_state(&SessionState::Picking, "preview")?;

        let selection = self.registry.snapshot();
        let (items, position) = match scope {
            PreviewScope::Selection if selection.is_empty() => {
                return Err(SessionError::NothingToPreview);
            }
            PreviewScope::Selection => (selection.clone(), 0),
            PreviewScope::Grid { position } => {
                let len = self.picking.candidates().len();
                if position >= len {
                    return Err(SessionError::NoSuchCandidate { position, len });
                }
                (self.picking.candidates().to_vec(), position)
            }
        };

        self.transition(SessionState::PreviewPending);
        Ok(PreviewRequest {
            items,
            position,
            selection,
            threshold: self.registry.threshold(),
        })
    }

    /// Feed the previewer's answer back
    ///
    /// The returned selection replaces the current one after the same vetting
    /// as a picking pass: disallowed kinds and repeats are dropped and items
    /// past the threshold do not fit. When the user confirmed from the
    /// preview the session then confirms.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless a preview is pending, `Terminated`
    /// once finished.
    pub fn complete_preview(&mut self, outcome: FlowOutcome<PreviewResult>) -> Result<SessionNotice> {
        self.expect_state(&SessionState::PreviewPending, "complete preview")?;

        let vetted = self.preview_flow().finish(outcome);
        self.transition(SessionState::Picking);
        self.merge_preview(vetted)
    }

    /// Request, run the previewer and complete in one call
    ///
    /// # Errors
    ///
    /// Same as [`request_preview`](Self::request_preview).
    pub fn run_preview(
        &mut self,
        scope: PreviewScope,
        previewer: &dyn Previewer,
    ) -> Result<SessionNotice> {
        let request = self.request_preview(scope)?;
        let vetted = self.preview_flow().run(&request, previewer);
        self.transition(SessionState::Picking);
        self.merge_preview(vetted)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn merge_capture(&mut self, vetted: FlowOutcome<MediaItem>) -> SessionNotice {
        match vetted {
            FlowOutcome::Completed(item) => {
                self.picking.insert_captured(item.clone());
                self.add_one(item)
            }
            FlowOutcome::Cancelled => {
                debug!(target = "mediapick.session", "capture cancelled");
                SessionNotice::SubFlowCancelled(FlowKind::Capture)
            }
            FlowOutcome::Failed(reason) => self.sub_flow_failed(FlowKind::Capture, reason),
        }
    }

    fn merge_crop(&mut self, index: usize, vetted: FlowOutcome<MediaItem>) -> Result<SessionNotice> {
        match vetted {
            FlowOutcome::Completed(item) => {
                let current = item.locator().clone();
                match self.registry.replace_at(index, item) {
                    Ok(previous) => {
                        info!(
                            target = "mediapick.session",
                            index,
                            previous = %previous.locator(),
                            current = %current,
                            "crop applied"
                        );
                        Ok(SessionNotice::Replaced {
                            index,
                            previous: previous.locator().clone(),
                            current,
                        })
                    }
                    Err(RegistryError::DuplicateItem(locator)) => {
                        warn!(target = "mediapick.session", %locator, "crop result already selected");
                        Ok(SessionNotice::AlreadySelected(locator))
                    }
                    Err(e) => Err(self.desync(e)),
                }
            }
            FlowOutcome::Cancelled => {
                debug!(target = "mediapick.session", index, "crop cancelled");
                Ok(SessionNotice::SubFlowCancelled(FlowKind::Crop))
            }
            FlowOutcome::Failed(reason) => Ok(self.sub_flow_failed(FlowKind::Crop, reason)),
        }
    }

    fn merge_preview(&mut self, vetted: FlowOutcome<VettedPreview>) -> Result<SessionNotice> {
        let VettedPreview { confirm, batch } = match vetted {
            FlowOutcome::Completed(vetted) => vetted,
            FlowOutcome::Cancelled => {
                debug!(target = "mediapick.session", "preview cancelled");
                return Ok(SessionNotice::SubFlowCancelled(FlowKind::Preview));
            }
            FlowOutcome::Failed(reason) => {
                return Ok(self.sub_flow_failed(FlowKind::Preview, reason));
            }
        };

        let mut report = MergeReport {
            rejected: batch.rejected,
            duplicates: batch.duplicates,
            ..MergeReport::default()
        };
        let mut registry = SelectionRegistry::new(self.registry.threshold());
        for item in batch.items {
            let fresh = !self.registry.contains(item.locator());
            match registry.add(item) {
                Ok(()) if fresh => report.added += 1,
                Ok(()) => {}
                Err(RegistryError::ThresholdExceeded { .. }) => report.dropped += 1,
                Err(_) => report.duplicates += 1,
            }
        }
        let removed = self
            .registry
            .iter()
            .filter(|item| !registry.contains(item.locator()))
            .count();
        self.registry = registry;

        info!(
            target = "mediapick.session",
            added = report.added,
            removed,
            dropped = report.dropped,
            rejected = report.rejected,
            selected = self.registry.len(),
            confirm,
            "preview merged"
        );
        if confirm {
            return self.confirm();
        }
        Ok(SessionNotice::Previewed { removed, report })
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(target = "mediapick.session", from = %self.state, to = %next, "transition");
            self.state = next;
        }
    }

    fn ensure_live(&self, intent: &'static str) -> Result<()> {
        if self.state.is_terminal() {
            debug!(target = "mediapick.session", intent, state = %self.state, "intent after finish");
            return Err(SessionError::Terminated(self.state.clone()));
        }
        Ok(())
    }

    fn expect_state(&self, expected: &SessionState, intent: &'static str) -> Result<()> {
        self.ensure_live(intent)?;
        if &self.state != expected {
            return Err(self.invalid(intent));
        }
        Ok(())
    }

    fn invalid(&self, intent: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state.clone(),
            intent,
        }
    }

    fn capture_flow(&self) -> Result<CaptureFlow> {
        CaptureFlow::for_picker(&self.config)?.ok_or(SessionError::CaptureUnsupported)
    }

    const fn preview_flow(&self) -> PreviewFlow {
        PreviewFlow::new(self.picking.filter())
    }

    fn crop_flow(&mut self, index: usize) -> Result<CropFlow> {
        let config = self
            .config
            .crop()
            .cloned()
            .ok_or(SessionError::CropUnsupported)?;

        match self.registry.get(index) {
            Some(source) => Ok(CropFlow::new(config, source.clone(), index)),
            None => {
                let len = self.registry.len();
                Err(self.desync(RegistryError::IndexOutOfRange { index, len }))
            }
        }
    }

    fn add_one(&mut self, item: MediaItem) -> SessionNotice {
        let locator = item.locator().clone();
        match self.registry.add(item) {
            Ok(()) => {
                debug!(
                    target = "mediapick.session",
                    %locator,
                    selected = self.registry.len(),
                    "selected"
                );
                SessionNotice::Added(locator)
            }
            Err(RegistryError::ThresholdExceeded { threshold }) => {
                info!(target = "mediapick.session", %locator, threshold, "selection full, item dropped");
                SessionNotice::ThresholdReached { threshold }
            }
            Err(_) => SessionNotice::AlreadySelected(locator),
        }
    }

    fn sub_flow_failed(&self, kind: FlowKind, reason: String) -> SessionNotice {
        warn!(target = "mediapick.session", %kind, %reason, "sub-flow failed");
        SessionNotice::SubFlowFailed { kind, reason }
    }

    fn desync(&mut self, error: RegistryError) -> SessionError {
        error!(target = "mediapick.session", %error, state = %self.state, "selection desync");
        self.transition(SessionState::Failed);
        self.channel.fire(SelectionOutcome::Failed(error.to_string()));
        SessionError::Desync(error)
    }
}
