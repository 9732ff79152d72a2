//! Abstract storage trait for the durable achievement snapshot.
//!
//! The snapshot is written synchronously after every state-changing
//! detection event and read once at startup. Writes are best-effort and
//! non-transactional: a crash between increment and persist loses at most
//! the most recent event's durability, never the in-memory state for the
//! remainder of the run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Underlying I/O failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable snapshot of counters and unlock state.
///
/// Unlock times are epoch milliseconds; 0 (or an absent entry) means never
/// unlocked. Catalog entries absent from a loaded snapshot stay in their
/// default locked state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Occurrence counters by key, including the derived TOTAL entry.
    #[serde(default)]
    pub counters: HashMap<String, u64>,

    /// Unlock flags by achievement id.
    #[serde(default)]
    pub unlocked_achievements: HashMap<String, bool>,

    /// Unlock times by achievement id, epoch milliseconds.
    #[serde(default)]
    pub achievement_unlock_times: HashMap<String, i64>,
}

/// Storage backend for the achievement snapshot.
///
/// # Safety Considerations
/// - `save` replaces the whole snapshot; there is no partial update
/// - Implementations should tolerate concurrent calls from multiple
///   detection threads
pub trait StateStore: Send + Sync {
    /// Loads the last saved snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<PersistedState>, StorageError>;

    /// Saves a full snapshot, replacing any previous one.
    fn save(&self, state: &PersistedState) -> Result<(), StorageError>;
}
