//! Error types for Faultline.
//!
//! All errors are strongly typed using thiserror. This enables pattern
//! matching on specific error conditions and provides clear error messages.
//! Unresolvable exception names are deliberately NOT errors; resolution
//! failure is an expected "no match" outcome on the detection path.

use thiserror::Error;

use crate::storage::StorageError;

/// Configuration errors raised at the settings boundary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown voice pack variant: '{name}'")]
    UnknownPackVariant {
        name: String,
    },

    #[error("Volume {value} is out of range [0, 100]")]
    VolumeOutOfRange {
        value: u16,
    },

    #[error("Duplicate achievement id in catalog: '{id}'")]
    DuplicateAchievementId {
        id: String,
    },

    #[error("Achievement '{id}' has a zero threshold")]
    ZeroThreshold {
        id: String,
    },
}

/// Cue delivery errors reported by the audio and notification collaborators.
///
/// These are recovered locally by the dispatcher: a failed cue is logged and
/// treated as "no cue produced," never propagated to the detector or the
/// achievement path.
#[derive(Debug, Error)]
pub enum CueError {
    #[error("Audio asset not found: {path}")]
    AssetMissing {
        path: String,
    },

    #[error("Audio device unavailable: {message}")]
    DeviceUnavailable {
        message: String,
    },

    #[error("Unsupported audio format: {path}")]
    UnsupportedFormat {
        path: String,
    },

    #[error("Playback failed: {message}")]
    PlaybackFailed {
        message: String,
    },

    #[error("Notification delivery failed: {message}")]
    NotificationFailed {
        message: String,
    },
}

/// Top-level error type for Faultline.
///
/// This enum encompasses all possible errors that can occur when using the
/// pipeline.
#[derive(Debug, Error)]
pub enum FaultlineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Event stream disconnected")]
    StreamDisconnected,

    #[error("Event stream receive timed out after {duration_ms}ms")]
    StreamTimeout {
        duration_ms: u64,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FaultlineError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a cue delivery error.
    #[must_use]
    pub const fn is_cue(&self) -> bool {
        matches!(self, Self::Cue(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if the error only affects durability or cue delivery,
    /// never the in-memory pipeline state for the current run.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Cue(_) | Self::Storage(_) => true,
            Self::Config(_)
            | Self::StreamDisconnected
            | Self::StreamTimeout { .. }
            | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for Faultline operations.
pub type FaultlineResult<T> = Result<T, FaultlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_unknown_pack() {
        let err = ConfigError::UnknownPackVariant {
            name: "counter-strike".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("counter-strike"));
        assert!(msg.contains("Unknown voice pack"));
    }

    #[test]
    fn test_config_error_volume_range() {
        let err = ConfigError::VolumeOutOfRange { value: 150 };
        let msg = format!("{err}");
        assert!(msg.contains("150"));
        assert!(msg.contains("[0, 100]"));
    }

    #[test]
    fn test_cue_error_display() {
        let err = CueError::AssetMissing {
            path: "voice-packs/medic/default.wav".to_string(),
        };
        assert!(err.to_string().contains("voice-packs/medic/default.wav"));

        let err = CueError::DeviceUnavailable {
            message: "no output device".to_string(),
        };
        assert!(err.to_string().contains("no output device"));
    }

    #[test]
    fn test_faultline_error_from_config() {
        let config_err = ConfigError::UnknownPackVariant {
            name: "x".to_string(),
        };
        let err: FaultlineError = config_err.into();
        assert!(err.is_config());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_faultline_error_from_cue() {
        let cue_err = CueError::PlaybackFailed {
            message: "device busy".to_string(),
        };
        let err: FaultlineError = cue_err.into();
        assert!(err.is_cue());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_faultline_error_from_storage() {
        let storage_err = StorageError::BackendError("disk full".to_string());
        let err: FaultlineError = storage_err.into();
        assert!(err.is_storage());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_faultline_error_internal() {
        let err = FaultlineError::internal("unexpected state");
        assert!(!err.is_recoverable());
        let msg = format!("{err}");
        assert!(msg.contains("unexpected state"));
    }
}
