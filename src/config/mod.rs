//! Configuration model for selection sessions
//!
//! Every configuration is an immutable value produced by a builder. Each value
//! can hand back a builder seeded with all of its fields (`rebuild`), so a
//! caller can re-derive a full configuration from a few live inputs while the
//! untouched fields, including nested capture and crop configs, carry over.
//!
//! - [`PickerConfig`]: the session configuration, optionally embedding
//!   [`CaptureConfig`] and [`CropConfig`]
//! - [`PickerSettings`]: persisted defaults loaded from the user's config file

mod capture;
mod crop;
mod error;
mod picker;
mod settings;

pub use capture::{CaptureConfig, CaptureConfigBuilder};
pub use crop::{CropConfig, CropConfigBuilder};
pub use error::InvalidConfig;
pub use picker::{Appearance, PickerConfig, PickerConfigBuilder, PickerOverrides};
pub use settings::{CameraSettings, CropSettings, PickerSettings};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for configuration building
pub type Result<T> = std::result::Result<T, InvalidConfig>;

/// Highest accepted output quality
pub const MAX_QUALITY: u8 = 100;

/// Default output quality for captures and crops
pub const DEFAULT_QUALITY: u8 = 80;

/// Aspect ratio descriptor (`x:y`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub x: u32,
    pub y: u32,
}

impl AspectRatio {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// 1:1
    #[must_use]
    pub const fn square() -> Self {
        Self::new(1, 1)
    }

    pub(crate) fn validate(self, field: &'static str) -> Result<()> {
        if self.x == 0 || self.y == 0 {
            return Err(InvalidConfig::new(
                field,
                format!("components must be positive, got {self}"),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// Where a capture or crop result should be written
///
/// Opaque to this crate: it is passed through to the capture device or the
/// cropper and never resolved here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLocation {
    /// Target directory, relative to whatever root the host uses
    #[serde(default)]
    pub directory: PathBuf,
    /// File-provider authority, for hosts that need one
    #[serde(default)]
    pub authority: Option<String>,
}

impl OutputLocation {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            authority: None,
        }
    }

    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }
}

pub(crate) fn validate_quality(field: &'static str, quality: u8) -> Result<()> {
    if quality > MAX_QUALITY {
        return Err(InvalidConfig::new(
            field,
            format!("must be within 0..={MAX_QUALITY}, got {quality}"),
        ));
    }
    Ok(())
}
