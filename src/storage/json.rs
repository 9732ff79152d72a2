//! JSON file storage backend.
//!
//! One snapshot file, rewritten in full on every save. Deliberately
//! non-transactional: the write path is a plain truncate-and-write, and a
//! torn write costs at most the snapshot being rewritten on the next
//! detection event.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::{PersistedState, StateStore, StorageError};

/// Persists the snapshot as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Creates a store writing to `path`. The file and its parent
    /// directories are created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        Ok(Some(state))
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        let mut state = PersistedState::default();
        state.counters.insert("ArithmeticException".to_string(), 7);
        state.counters.insert("TOTAL".to_string(), 7);
        state
            .unlocked_achievements
            .insert("arith_1".to_string(), true);
        state
            .achievement_unlock_times
            .insert("arith_1".to_string(), 1_700_000_000_000);

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), state);
    }

    #[test]
    fn parent_directories_are_created_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested/deeper/state.json"));

        store.save(&PersistedState::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn corrupt_snapshot_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonStateStore::new(path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, StorageError::SerializationError(_)));
    }
}
