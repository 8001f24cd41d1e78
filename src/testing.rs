//! Testing utilities for mediapick
//!
//! Media item fixtures and a `TestStore` wrapper for a throwaway session
//! store.
//!
//! Only available when compiled with `cfg(test)`.

use crate::media::{MediaItem, MediaKind};
use crate::session::SessionStore;
use std::path::Path;
use tempfile::TempDir;

/// Still image at `{name}.jpg`
#[must_use]
pub fn image(name: &str) -> MediaItem {
    MediaItem::image(format!("{name}.jpg"))
}

/// Animated GIF at `{name}.gif`
#[must_use]
pub fn gif(name: &str) -> MediaItem {
    MediaItem::new(format!("{name}.gif"), MediaKind::Gif)
}

/// Video at `{name}.mp4`
#[must_use]
pub fn video(name: &str) -> MediaItem {
    MediaItem::new(format!("{name}.mp4"), MediaKind::Video)
}

/// Session store in a temporary directory, removed on drop
///
/// ```ignore
/// let store = TestStore::new();
/// store.store().save("s", &snapshot).unwrap();
/// ```
pub struct TestStore {
    store: SessionStore,
    dir: TempDir,
}

impl TestStore {
    /// # Panics
    /// Panics if the temporary directory or the store cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = SessionStore::open(dir.path()).expect("Failed to open test store");
        Self { store, dir }
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_kinds() {
        assert!(image("a").is_image());
        assert_eq!(gif("a").kind(), MediaKind::Gif);
        assert_eq!(video("a").locator().as_str(), "a.mp4");
    }

    #[test]
    fn test_store_starts_empty() {
        let store = TestStore::new();
        assert!(store.store().is_empty());
        assert!(store.path().exists());
    }
}
