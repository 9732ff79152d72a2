//! In-memory storage backend.
//!
//! Thread-safe snapshot holder for embedded usage and tests.

use std::sync::{Mutex, PoisonError};

use crate::storage::traits::{PersistedState, StateStore, StorageError};

/// Keeps the snapshot in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: Mutex<Option<PersistedState>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a snapshot, as if it had been saved
    /// by a previous run.
    #[must_use]
    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<PersistedState>, StorageError> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StorageError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        Ok(())
    }
}
