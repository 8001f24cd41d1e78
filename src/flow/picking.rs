//! Grid picking controller
//!
//! Candidates are grouped into folders. Folder 0 holds every candidate; the
//! rest group candidates by the directory part of their locator, in the
//! order the directories first appear. The grid shows one folder at a time.

use super::traits::MediaSource;
use super::FlowOutcome;
use crate::media::{MediaFilter, MediaItem};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Name of the folder holding every candidate
pub const ALL_FOLDER: &str = "All media";

/// Items the user chose in one pass, after vetting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickedBatch {
    /// Accepted items, in the order they were chosen
    pub items: Vec<MediaItem>,
    /// Items dropped because their kind is not allowed
    pub rejected: usize,
    /// Repeated locators collapsed into their first occurrence
    pub duplicates: usize,
}

/// Drop kinds the filter rejects and collapse repeated locators, keeping
/// first occurrences
pub(super) fn vet(filter: MediaFilter, batch: Vec<MediaItem>) -> PickedBatch {
    let mut seen = HashSet::new();
    let mut vetted = PickedBatch {
        items: Vec::with_capacity(batch.len()),
        ..PickedBatch::default()
    };

    for item in batch {
        if !filter.accepts(item.kind()) {
            vetted.rejected += 1;
        } else if seen.insert(item.locator().clone()) {
            vetted.items.push(item);
        } else {
            vetted.duplicates += 1;
        }
    }

    vetted
}

/// Candidates sharing a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    name: String,
    /// Directory shared by the items; `None` for the all-media folder
    path: Option<String>,
    items: Vec<MediaItem>,
}

impl Folder {
    fn all() -> Self {
        Self {
            name: ALL_FOLDER.to_string(),
            path: None,
            items: Vec::new(),
        }
    }

    fn at(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        Self {
            name: name.to_string(),
            path: Some(path.to_string()),
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert_first(&mut self, item: MediaItem) {
        self.items
            .retain(|existing| existing.locator() != item.locator());
        self.items.insert(0, item);
    }
}

/// Directory part of a locator, if it has one
fn parent_dir(locator: &str) -> Option<&str> {
    locator
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

/// Picking state retained while other sub-flows run
///
/// Holds the filter derived from the session config, the folders of
/// candidates, and which folder the grid shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingFlow {
    filter: MediaFilter,
    folders: Vec<Folder>,
    checked: usize,
}

impl PickingFlow {
    #[must_use]
    pub fn new(filter: MediaFilter) -> Self {
        Self {
            filter,
            folders: vec![Folder::all()],
            checked: 0,
        }
    }

    #[must_use]
    pub const fn filter(&self) -> MediaFilter {
        self.filter
    }

    /// Items currently shown in the grid
    #[must_use]
    pub fn candidates(&self) -> &[MediaItem] {
        self.folders
            .get(self.checked)
            .map_or(&[], |folder| folder.items.as_slice())
    }

    /// Every folder, the all-media folder first
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Index of the folder shown in the grid
    #[must_use]
    pub const fn checked_folder(&self) -> usize {
        self.checked
    }

    /// Show another folder in the grid
    ///
    /// Returns `None`, leaving the grid alone, if there is no such folder.
    pub fn check_folder(&mut self, index: usize) -> Option<&Folder> {
        if index >= self.folders.len() {
            return None;
        }
        self.checked = index;
        self.folders.get(index)
    }

    /// Replace the candidates with a fresh query and show the all-media folder
    ///
    /// Returns the number of candidates loaded. The source is trusted to
    /// honour the filter, but anything it lets through is filtered again here.
    pub fn load(&mut self, source: &dyn MediaSource) -> FlowOutcome<usize> {
        match source.load(&self.filter) {
            Ok(items) => {
                let items = vet(self.filter, items).items;
                let count = items.len();
                self.folders = Self::group(items);
                self.checked = 0;
                debug!(
                    target = "mediapick.flow",
                    count,
                    folders = self.folders.len(),
                    "candidates loaded"
                );
                FlowOutcome::Completed(count)
            }
            Err(e) => FlowOutcome::from(Err(e)),
        }
    }

    /// Vet a batch of chosen items
    #[must_use]
    pub fn accept(&self, batch: Vec<MediaItem>) -> PickedBatch {
        vet(self.filter, batch)
    }

    /// Show a freshly captured item first in the current folder and in the
    /// all-media folder
    pub fn insert_captured(&mut self, item: MediaItem) {
        if self.checked != 0 {
            if let Some(all) = self.folders.first_mut() {
                all.insert_first(item.clone());
            }
        }
        if let Some(current) = self.folders.get_mut(self.checked) {
            current.insert_first(item);
        }
    }

    /// Whether the shown folder exists, e.g. after decoding a snapshot
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.folders.first().is_some_and(|all| all.path.is_none())
            && self.checked < self.folders.len()
    }

    fn group(items: Vec<MediaItem>) -> Vec<Folder> {
        let mut folders = vec![Folder::all()];
        let mut by_path: HashMap<String, usize> = HashMap::new();

        for item in items {
            if let Some(dir) = parent_dir(item.locator().as_str()) {
                let index = *by_path.entry(dir.to_string()).or_insert_with(|| {
                    folders.push(Folder::at(dir));
                    folders.len() - 1
                });
                folders[index].items.push(item.clone());
            }
            folders[0].items.push(item);
        }

        folders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::mock::MockMediaSource;
    use crate::testing::{gif, image, video};

    fn at(path: &str) -> MediaItem {
        MediaItem::infer(path)
    }

    fn library() -> MockMediaSource {
        MockMediaSource::new(vec![
            at("DCIM/Camera/1.jpg"),
            at("Pictures/Screenshots/2.jpg"),
            at("DCIM/Camera/3.jpg"),
            at("loose.jpg"),
        ])
    }

    #[test]
    fn test_accept_filters_disallowed_kinds() {
        let flow = PickingFlow::new(MediaFilter::new(true, false));

        let batch = flow.accept(vec![image("a"), video("v"), gif("g")]);

        assert_eq!(batch.items, vec![image("a"), gif("g")]);
        assert_eq!(batch.rejected, 1);
    }

    #[test]
    fn test_accept_collapses_duplicates() {
        let flow = PickingFlow::new(MediaFilter::default());

        let batch = flow.accept(vec![image("a"), image("b"), image("a")]);

        assert_eq!(batch.items, vec![image("a"), image("b")]);
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.duplicates, 1);
    }

    #[test]
    fn test_load_applies_filter() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        let source = MockMediaSource::new(vec![image("a"), video("v"), image("b")]);

        let outcome = flow.load(&source);

        assert_eq!(outcome, FlowOutcome::Completed(2));
        assert_eq!(flow.candidates(), &[image("a"), image("b")]);
    }

    #[test]
    fn test_load_failure_keeps_previous_candidates() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        flow.load(&MockMediaSource::new(vec![image("a")]));

        let outcome = flow.load(&MockMediaSource::failing("index locked"));

        assert!(matches!(outcome, FlowOutcome::Failed(_)));
        assert_eq!(flow.candidates().len(), 1);
    }

    #[test]
    fn test_load_groups_by_directory() {
        let mut flow = PickingFlow::new(MediaFilter::default());

        flow.load(&library());

        let names: Vec<_> = flow.folders().iter().map(Folder::name).collect();
        assert_eq!(names, vec![ALL_FOLDER, "Camera", "Screenshots"]);
        assert_eq!(flow.folders()[0].len(), 4);
        assert_eq!(flow.folders()[1].path(), Some("DCIM/Camera"));
        assert_eq!(
            flow.folders()[1].items(),
            &[at("DCIM/Camera/1.jpg"), at("DCIM/Camera/3.jpg")]
        );
        assert_eq!(flow.checked_folder(), 0);
        assert_eq!(flow.candidates().len(), 4);
    }

    #[test]
    fn test_check_folder_switches_grid() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        flow.load(&library());

        assert_eq!(flow.check_folder(2).map(Folder::name), Some("Screenshots"));
        assert_eq!(flow.candidates(), &[at("Pictures/Screenshots/2.jpg")]);

        assert!(flow.check_folder(3).is_none());
        assert_eq!(flow.checked_folder(), 2);
    }

    #[test]
    fn test_reload_shows_all_media_again() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        flow.load(&library());
        flow.check_folder(1);

        flow.load(&library());

        assert_eq!(flow.checked_folder(), 0);
    }

    #[test]
    fn test_insert_captured_goes_first_once() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        flow.load(&MockMediaSource::new(vec![image("a"), image("b")]));

        flow.insert_captured(image("b"));
        flow.insert_captured(image("cam"));

        assert_eq!(flow.candidates(), &[image("cam"), image("b"), image("a")]);
    }

    #[test]
    fn test_insert_captured_into_current_and_all_media() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        flow.load(&library());
        flow.check_folder(2);

        flow.insert_captured(at("DCIM/Camera/new.jpg"));

        assert_eq!(flow.candidates()[0], at("DCIM/Camera/new.jpg"));
        assert_eq!(flow.folders()[0].items()[0], at("DCIM/Camera/new.jpg"));
        assert_eq!(flow.folders()[0].len(), 5);
        assert_eq!(flow.folders()[1].len(), 2);
    }

    #[test]
    fn test_consistency() {
        let mut flow = PickingFlow::new(MediaFilter::default());
        assert!(flow.is_consistent());

        flow.checked = 3;
        assert!(!flow.is_consistent());
    }
}
