//! Cue configuration boundary.
//!
//! Settings are owned by an external UI collaborator; the pipeline only
//! reads them, once per dispatch, so changes take effect on the next
//! detection event. `InMemorySettings` is the embedded/test implementation.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::voice::PackVariant;

/// Snapshot of the cue configuration read at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueSettings {
    /// Whether audio cues are played.
    pub sound_enabled: bool,
    /// Whether notification lines are shown.
    pub notification_enabled: bool,
    /// Raw volume control value, 0-100.
    pub volume: u8,
    /// Selected voice pack.
    pub pack: PackVariant,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notification_enabled: true,
            volume: 50,
            pack: PackVariant::default(),
        }
    }
}

/// Read access to the current cue configuration.
pub trait SettingsProvider: Send + Sync {
    /// Returns the configuration in effect right now.
    fn cue_settings(&self) -> CueSettings;
}

/// Thread-safe in-memory settings store.
///
/// Callers changing the pack variant are expected to also call
/// `reset_debounce` on the pipeline so a stale cooldown does not swallow
/// the first cue under the new pack.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    inner: RwLock<CueSettings>,
}

impl InMemorySettings {
    /// Creates a store with the given initial settings.
    #[must_use]
    pub fn new(settings: CueSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    /// Enables or disables audio cues.
    pub fn set_sound_enabled(&self, enabled: bool) {
        self.write().sound_enabled = enabled;
    }

    /// Enables or disables notification lines.
    pub fn set_notification_enabled(&self, enabled: bool) {
        self.write().notification_enabled = enabled;
    }

    /// Sets the raw volume. Values above 100 are a configuration error.
    pub fn set_volume(&self, volume: u8) -> Result<(), ConfigError> {
        if volume > 100 {
            return Err(ConfigError::VolumeOutOfRange {
                value: u16::from(volume),
            });
        }
        self.write().volume = volume;
        Ok(())
    }

    /// Selects a voice pack.
    pub fn set_pack(&self, pack: PackVariant) {
        self.write().pack = pack;
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CueSettings> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsProvider for InMemorySettings {
    fn cue_settings(&self) -> CueSettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
