//! Preview controller
//!
//! A preview pages through items full size and lets the user check and
//! uncheck them against the selection. It answers with the selection the user
//! left with and whether they confirmed from inside the preview.

use super::picking::{vet, PickedBatch};
use super::traits::{PreviewRequest, Previewer};
use super::FlowOutcome;
use crate::media::{MediaFilter, MediaItem};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a preview opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewScope {
    /// Page through the selection from its first item
    Selection,
    /// Page through the grid from the candidate at `position`
    Grid { position: usize },
}

/// What the user left the preview with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Confirmed from inside the preview
    pub confirm: bool,
    /// Selection as edited in the preview, in order
    pub selection: Vec<MediaItem>,
}

impl PreviewResult {
    /// Left the preview without confirming
    #[must_use]
    pub const fn kept(selection: Vec<MediaItem>) -> Self {
        Self {
            confirm: false,
            selection,
        }
    }

    /// Confirmed from inside the preview
    #[must_use]
    pub const fn confirmed(selection: Vec<MediaItem>) -> Self {
        Self {
            confirm: true,
            selection,
        }
    }
}

/// A preview answer after vetting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VettedPreview {
    pub confirm: bool,
    /// Allowed, distinct items; the threshold is left to the registry
    pub batch: PickedBatch,
}

/// One preview round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewFlow {
    filter: MediaFilter,
}

impl PreviewFlow {
    #[must_use]
    pub const fn new(filter: MediaFilter) -> Self {
        Self { filter }
    }

    /// Vet the previewer's answer
    ///
    /// The previewer may hand back anything, so disallowed kinds and repeated
    /// locators are dropped here just as for a picking pass.
    #[must_use]
    pub fn finish(&self, outcome: FlowOutcome<PreviewResult>) -> FlowOutcome<VettedPreview> {
        outcome.map(|result| VettedPreview {
            confirm: result.confirm,
            batch: vet(self.filter, result.selection),
        })
    }

    /// Show the request, then vet the answer
    pub fn run(
        &self,
        request: &PreviewRequest,
        previewer: &dyn Previewer,
    ) -> FlowOutcome<VettedPreview> {
        let outcome = previewer.preview(request);
        debug!(
            target = "mediapick.flow",
            items = request.items.len(),
            completed = outcome.is_completed(),
            "preview returned"
        );
        self.finish(outcome)
    }
}
