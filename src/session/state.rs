//! Session lifecycle states

use crate::media::Locator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a [`SelectionSession`](super::SelectionSession) is in its lifecycle
///
/// ```text
/// Idle ──start──▶ Picking ──request_capture──▶ CapturePending ──complete/cancel──┐
///                  │  ▲                                                          │
///                  │  └──────────────────────────────────────────────────────────┘
///                  │  ▲
///                  │  └── complete/cancel ◀── CropPending { index } ◀──request_crop
///                  │  ▲
///                  │  └── complete/cancel ◀── PreviewPending ◀──request_preview
///                  ├──confirm──▶ Resolved     (also from PreviewPending when confirmed)
///                  └──abort────▶ Cancelled        (desync from anywhere ──▶ Failed)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, not yet started
    Idle,
    /// Grid is shown and the user is selecting
    Picking,
    /// Waiting for the camera to return
    CapturePending,
    /// Waiting for the cropper to return for the item at `index`
    CropPending { index: usize, source: Locator },
    /// Waiting for the previewer to hand back the selection
    PreviewPending,
    Resolved,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Whether the session has finished and accepts no more intents
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled | Self::Failed)
    }

    /// Whether a sub-flow is outstanding
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::CapturePending | Self::CropPending { .. } | Self::PreviewPending
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Picking => f.write_str("picking"),
            Self::CapturePending => f.write_str("waiting for capture"),
            Self::CropPending { index, source } => {
                write!(f, "waiting for crop of #{} ({source})", index + 1)
            }
            Self::PreviewPending => f.write_str("previewing"),
            Self::Resolved => f.write_str("resolved"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
