//! Media item model
//!
//! A [`MediaItem`] is an opaque handle on a piece of media: a content locator,
//! a kind and an optional thumbnail. Identity is the locator alone, so two
//! items with the same locator compare equal even when their metadata differs.
//!
//! The crate never resolves locators. They are whatever the host's media
//! index, camera or cropper hands back (a path, a content URI, a key).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Content locator, the identity of a [`MediaItem`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Create a locator from anything string-like
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw locator string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Locator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of media behind a locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still picture
    Image,
    /// Animated GIF
    Gif,
    /// Video clip
    Video,
}

impl MediaKind {
    /// Guess the kind from a locator's extension, defaulting to [`MediaKind::Image`]
    #[must_use]
    pub fn from_extension(locator: &str) -> Self {
        let ext = locator
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "gif" => Self::Gif,
            "mp4" | "mov" | "mkv" | "webm" | "3gp" | "avi" => Self::Video,
            _ => Self::Image,
        }
    }

    /// Lowercase label used in output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Gif => "gif",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive metadata carried along with an item
///
/// Never consulted for identity or ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMeta {
    /// MIME type reported by the source
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size_bytes: u64,
    /// Duration for videos, in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
    /// When the item was added to the source (or captured)
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

/// Opaque media handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    locator: Locator,
    kind: MediaKind,
    #[serde(default)]
    thumbnail: Option<Locator>,
    #[serde(default)]
    meta: MediaMeta,
}

impl MediaItem {
    /// Create an item with no thumbnail and empty metadata
    #[must_use]
    pub fn new(locator: impl Into<Locator>, kind: MediaKind) -> Self {
        Self {
            locator: locator.into(),
            kind,
            thumbnail: None,
            meta: MediaMeta::default(),
        }
    }

    /// Shorthand for a still image
    #[must_use]
    pub fn image(locator: impl Into<Locator>) -> Self {
        Self::new(locator, MediaKind::Image)
    }

    /// Create an item, inferring its kind from the locator's extension
    #[must_use]
    pub fn infer(locator: &str) -> Self {
        Self::new(locator, MediaKind::from_extension(locator))
    }

    /// Attach a thumbnail locator
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<Locator>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Attach metadata
    #[must_use]
    pub fn with_meta(mut self, meta: MediaMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    #[must_use]
    pub const fn thumbnail(&self) -> Option<&Locator> {
        self.thumbnail.as_ref()
    }

    #[must_use]
    pub const fn meta(&self) -> &MediaMeta {
        &self.meta
    }

    /// Whether this item is a still image (the only kind that can be cropped)
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

impl PartialEq for MediaItem {
    fn eq(&self, other: &Self) -> bool {
        self.locator == other.locator
    }
}

impl Eq for MediaItem {}

impl Hash for MediaItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locator.hash(state);
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.locator, self.kind)
    }
}

/// Which media kinds a picking session accepts
///
/// Images are always accepted; GIFs and videos are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaFilter {
    pub include_gif: bool,
    pub include_video: bool,
}

impl MediaFilter {
    #[must_use]
    pub const fn new(include_gif: bool, include_video: bool) -> Self {
        Self {
            include_gif,
            include_video,
        }
    }

    /// Check whether an item of the given kind passes the filter
    #[must_use]
    pub const fn accepts(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Image => true,
            MediaKind::Gif => self.include_gif,
            MediaKind::Video => self.include_video,
        }
    }
}
