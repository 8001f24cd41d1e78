//! Persistence of suspended sessions
//!
//! A host that gets torn down while a sub-flow is outstanding saves a
//! [`SessionSnapshot`] and resumes it later. Snapshots are kept in a
//! `sessions` tree of a sled database, keyed by name and encoded with
//! bincode.

use super::SessionSnapshot;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

const REOPEN_INTERVAL: Duration = Duration::from_millis(25);

/// Errors from the session store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    SledError(#[from] sled::Error),

    #[error("Error while decoding snapshot: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),

    #[error("Error while encoding snapshot: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),

    #[error("Invalid session name: {0:?}")]
    InvalidName(String),
}

/// Named snapshots on disk
pub struct SessionStore {
    db: sled::Db,
    sessions: sled::Tree,
}

impl SessionStore {
    /// Open or create a store in the given directory
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SledError`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let sessions = db.open_tree("sessions")?;
        Ok(Self { db, sessions })
    }

    /// Open a store whose directory another handle may have just released
    ///
    /// sled keeps its directory lock until the flusher of a dropped handle
    /// has stopped, so an open right after a drop can fail. Lock contention
    /// is retried until `timeout` elapses; other errors return at once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SledError`] if the database cannot be opened, or
    /// the lock is still held when `timeout` runs out.
    pub fn reopen<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let deadline = Instant::now() + timeout;
        loop {
            match Self::open(path) {
                Err(StoreError::SledError(error))
                    if is_lock_contention(&error) && Instant::now() < deadline =>
                {
                    debug!(target = "mediapick.store", path = %path.display(), "store locked, retrying");
                    thread::sleep(REOPEN_INTERVAL);
                }
                result => return result,
            }
        }
    }

    /// Save a snapshot, replacing any existing one with the same name
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the name is empty, encoding fails, or the
    /// write fails.
    pub fn save(&self, name: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        let key = Self::key(name)?;
        let value = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?;
        self.sessions.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load a snapshot by name
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read or decoding fails.
    pub fn load(&self, name: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let key = Self::key(name)?;
        match self.sessions.get(key)? {
            Some(bytes) => {
                let (snapshot, _): (SessionSnapshot, usize) =
                    bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Remove a snapshot, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let key = Self::key(name)?;
        let existed = self.sessions.remove(key)?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// Names of all saved snapshots, sorted
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if iteration fails.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        self.sessions
            .iter()
            .keys()
            .map(|key| {
                key.map(|k| String::from_utf8_lossy(&k).into_owned())
                    .map_err(StoreError::from)
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn key(name: &str) -> Result<&[u8], StoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed != name {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(name.as_bytes())
    }
}

fn is_lock_contention(error: &sled::Error) -> bool {
    match error {
        sled::Error::Io(e) => {
            e.kind() == io::ErrorKind::WouldBlock || e.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CropConfig, PickerConfig};
    use crate::flow::FlowOutcome;
    use crate::session::{SelectionSession, SessionState};
    use crate::testing::{image, TestStore};

    fn crop_pending_snapshot() -> SessionSnapshot {
        let config = PickerConfig::builder()
            .threshold(3)
            .crop(Some(CropConfig::builder().build().unwrap()))
            .picked(vec![image("a"), image("b")])
            .build()
            .unwrap();
        let mut session = SelectionSession::new();
        session.start(config).unwrap();
        session.request_crop(1).unwrap();
        session.suspend().unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let store = TestStore::new();
        let snapshot = crop_pending_snapshot();

        store.store().save("review", &snapshot).unwrap();
        let loaded = store.store().load("review").unwrap().unwrap();

        assert_eq!(loaded, snapshot);
        assert!(matches!(loaded.state, SessionState::CropPending { index: 1, .. }));
    }

    #[test]
    fn test_reopen_after_drop_keeps_snapshots() {
        let dir = tempfile::TempDir::new().unwrap();
        let snapshot = crop_pending_snapshot();

        let store = SessionStore::open(dir.path()).unwrap();
        store.save("review", &snapshot).unwrap();
        drop(store);

        let store = SessionStore::reopen(dir.path(), Duration::from_secs(10)).unwrap();
        assert_eq!(store.load("review").unwrap(), Some(snapshot));
    }

    #[test]
    fn test_lock_contention_detection() {
        let locked = sled::Error::Io(io::Error::other(
            "could not acquire lock on \"/tmp/db\": Os { code: 11, kind: WouldBlock }",
        ));
        let would_block = sled::Error::Io(io::Error::from(io::ErrorKind::WouldBlock));
        let missing = sled::Error::Io(io::Error::from(io::ErrorKind::NotFound));

        assert!(is_lock_contention(&locked));
        assert!(is_lock_contention(&would_block));
        assert!(!is_lock_contention(&missing));
        assert!(!is_lock_contention(&sled::Error::Unsupported("nope".into())));
    }

    #[test]
    fn test_load_missing() {
        let store = TestStore::new();
        assert!(store.store().load("nothing").unwrap().is_none());
    }

    #[test]
    fn test_names_and_remove() {
        let store = TestStore::new();
        let snapshot = crop_pending_snapshot();
        store.store().save("b", &snapshot).unwrap();
        store.store().save("a", &snapshot).unwrap();

        assert_eq!(store.store().names().unwrap(), vec!["a", "b"]);
        assert!(store.store().remove("a").unwrap());
        assert!(!store.store().remove("a").unwrap());
        assert_eq!(store.store().len(), 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let store = TestStore::new();
        let snapshot = crop_pending_snapshot();

        assert!(matches!(
            store.store().save("  ", &snapshot),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(
            store.store().load(" padded"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn test_resumed_session_finishes_pending_crop() {
        let store = TestStore::new();
        store.store().save("s", &crop_pending_snapshot()).unwrap();

        let snapshot = store.store().load("s").unwrap().unwrap();
        let mut session = SelectionSession::resume(snapshot).unwrap();
        session
            .complete_crop(FlowOutcome::Completed(image("b_cropped")))
            .unwrap();

        assert_eq!(session.selection(), vec![image("a"), image("b_cropped")]);
        assert_eq!(session.state(), &SessionState::Picking);
    }
}
