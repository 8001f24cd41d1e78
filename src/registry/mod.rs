//! Selection registry
//!
//! The ordered, deduplicated set of currently selected items. Order is
//! insertion order; the only way to change an entry in place is
//! [`SelectionRegistry::replace_at`], which keeps the entry's position.
//!
//! Invariant after every successful operation: `len() <= threshold()` and
//! no two entries share a locator. Failed operations never mutate.

pub mod error;

pub use error::RegistryError;

use crate::media::{Locator, MediaItem};
use serde::{Deserialize, Serialize};

/// Registry result type
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Ordered selection with set semantics on the locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRegistry {
    threshold: usize,
    items: Vec<MediaItem>,
}

impl SelectionRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            items: Vec::new(),
        }
    }

    /// Create a registry pre-seeded with a prior selection
    ///
    /// Duplicates in `items` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ThresholdExceeded`] if the distinct items do
    /// not fit.
    pub fn with_items<I>(threshold: usize, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = MediaItem>,
    {
        let mut registry = Self::new(threshold);
        for item in items {
            match registry.add(item) {
                Ok(()) | Err(RegistryError::DuplicateItem(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(registry)
    }

    /// Append an item
    ///
    /// A locator that is already selected is reported as a duplicate even
    /// when the registry is full.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateItem`] if the locator is present
    /// - [`RegistryError::ThresholdExceeded`] if the registry is full
    pub fn add(&mut self, item: MediaItem) -> Result<()> {
        if self.contains(item.locator()) {
            return Err(RegistryError::DuplicateItem(item.locator().clone()));
        }
        if self.is_full() {
            return Err(RegistryError::ThresholdExceeded {
                threshold: self.threshold,
            });
        }

        self.items.push(item);
        Ok(())
    }

    /// Replace the entry at `index`, keeping its position
    ///
    /// Returns the replaced item.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::IndexOutOfRange`] if `index >= len()`
    /// - [`RegistryError::DuplicateItem`] if `item`'s locator is already
    ///   selected at another index
    pub fn replace_at(&mut self, index: usize, item: MediaItem) -> Result<MediaItem> {
        let len = self.items.len();
        if index >= len {
            return Err(RegistryError::IndexOutOfRange { index, len });
        }
        if self
            .position(item.locator())
            .is_some_and(|existing| existing != index)
        {
            return Err(RegistryError::DuplicateItem(item.locator().clone()));
        }

        Ok(std::mem::replace(&mut self.items[index], item))
    }

    /// Remove an item by locator; removing an absent locator is a no-op
    ///
    /// Returns the removed item, if any.
    pub fn remove(&mut self, locator: &Locator) -> Option<MediaItem> {
        self.position(locator).map(|index| self.items.remove(index))
    }

    /// Copy of the current ordered selection
    #[must_use]
    pub fn snapshot(&self) -> Vec<MediaItem> {
        self.items.clone()
    }

    /// Read-only iteration without copying
    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    /// Index of the entry with `locator`
    #[must_use]
    pub fn position(&self, locator: &Locator) -> Option<usize> {
        self.items.iter().position(|item| item.locator() == locator)
    }

    #[must_use]
    pub fn contains(&self, locator: &Locator) -> bool {
        self.position(locator).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.threshold
    }

    /// Free slots left
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.threshold.saturating_sub(self.items.len())
    }

    #[must_use]
    pub const fn threshold(&self) -> usize {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gif, image};
    use std::collections::HashSet;

    fn locators(registry: &SelectionRegistry) -> Vec<String> {
        registry
            .iter()
            .map(|item| item.locator().to_string())
            .collect()
    }

    #[test]
    fn test_add_preserves_order() {
        let mut registry = SelectionRegistry::new(5);
        registry.add(image("b")).unwrap();
        registry.add(image("a")).unwrap();
        registry.add(gif("c")).unwrap();

        assert_eq!(locators(&registry), ["b.jpg", "a.jpg", "c.gif"]);
    }

    #[test]
    fn test_threshold_exceeded_does_not_mutate() {
        let mut registry = SelectionRegistry::new(3);
        registry.add(image("a")).unwrap();
        registry.add(image("b")).unwrap();
        registry.add(image("c")).unwrap();
        assert_eq!(registry.len(), 3);

        let result = registry.add(image("d"));

        assert_eq!(
            result,
            Err(RegistryError::ThresholdExceeded { threshold: 3 })
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(locators(&registry), ["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_duplicate_is_rejected_without_mutation() {
        let mut registry = SelectionRegistry::new(3);
        registry.add(image("a")).unwrap();

        let result = registry.add(image("a").with_thumbnail("thumb.jpg"));

        assert!(matches!(result, Err(RegistryError::DuplicateItem(_))));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(0).unwrap().thumbnail().is_none());
    }

    #[test]
    fn test_duplicate_reported_before_threshold() {
        let mut registry = SelectionRegistry::new(1);
        registry.add(image("a")).unwrap();

        assert!(matches!(
            registry.add(image("a")),
            Err(RegistryError::DuplicateItem(_))
        ));
    }

    #[test]
    fn test_replace_at_keeps_position_and_length() {
        let mut registry =
            SelectionRegistry::with_items(5, [image("a"), image("b"), image("c")]).unwrap();

        let old = registry.replace_at(1, image("b_cropped")).unwrap();

        assert_eq!(old.locator().as_str(), "b.jpg");
        assert_eq!(registry.len(), 3);
        assert_eq!(locators(&registry), ["a.jpg", "b_cropped.jpg", "c.jpg"]);
    }

    #[test]
    fn test_replace_at_same_locator_allowed() {
        let mut registry = SelectionRegistry::with_items(2, [image("a")]).unwrap();

        let replacement = image("a").with_thumbnail("a_thumb.jpg");
        registry.replace_at(0, replacement).unwrap();

        assert!(registry.get(0).unwrap().thumbnail().is_some());
    }

    #[test]
    fn test_replace_at_rejects_duplicate_elsewhere() {
        let mut registry = SelectionRegistry::with_items(3, [image("a"), image("b")]).unwrap();
        let before = registry.clone();

        let result = registry.replace_at(0, image("b"));

        assert!(matches!(result, Err(RegistryError::DuplicateItem(_))));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_replace_at_out_of_range() {
        let mut registry = SelectionRegistry::with_items(3, [image("a")]).unwrap();

        let result = registry.replace_at(1, image("z"));

        assert_eq!(
            result,
            Err(RegistryError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = SelectionRegistry::with_items(3, [image("a"), image("b")]).unwrap();

        assert!(registry.remove(image("a").locator()).is_some());
        assert!(registry.remove(image("a").locator()).is_none());
        assert!(registry.remove(&Locator::new("never")).is_none());
        assert_eq!(locators(&registry), ["b.jpg"]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut registry = SelectionRegistry::with_items(3, [image("a")]).unwrap();
        let snapshot = registry.snapshot();

        registry.add(image("b")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_with_items_skips_duplicates_and_rejects_overflow() {
        let registry =
            SelectionRegistry::with_items(2, [image("a"), image("a"), image("b")]).unwrap();
        assert_eq!(registry.len(), 2);

        let overflow = SelectionRegistry::with_items(1, [image("a"), image("b")]);
        assert!(overflow.is_err());
    }

    /// Every add sequence of length <= 6 over a 4-item alphabet, for every
    /// threshold from 1 to 4.
    #[test]
    fn test_invariants_hold_for_all_add_sequences() {
        const ALPHABET: [&str; 4] = ["a", "b", "c", "d"];
        const MAX_LEN: u32 = 6;

        for threshold in 1..=4 {
            for len in 0..=MAX_LEN {
                for mut code in 0..4_usize.pow(len) {
                    let mut registry = SelectionRegistry::new(threshold);

                    for _ in 0..len {
                        let before = registry.clone();
                        let result = registry.add(image(ALPHABET[code % 4]));
                        code /= 4;

                        if result.is_err() {
                            assert_eq!(registry, before);
                        }
                        assert!(registry.len() <= threshold);

                        let unique: HashSet<_> = registry.iter().map(MediaItem::locator).collect();
                        assert_eq!(unique.len(), registry.len());
                    }
                }
            }
        }
    }
}
