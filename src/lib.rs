//! # Faultline - the exception echo pipeline
//!
//! Faultline observes the console output of running processes, recognizes
//! mentions of exception/error names in that text, and turns each accepted
//! occurrence into two effects: an audible/visual cue and a gamified
//! achievement record (per-exception and total counters with threshold
//! unlocks).
//!
//! ## Core Concepts
//!
//! - **ExceptionIdentity**: a bare token resolved against an ordered list of
//!   namespace prefixes into a canonical fully-qualified name
//! - **DetectionEvent**: one accepted, de-duplicated recognition of an
//!   exception mention
//! - **Cue**: the combined audio + notification side effect of a detection
//! - **Achievement ladder**: ordered thresholds per counter key, unlocked
//!   exactly once and persisted across restarts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use faultline::{EchoPipeline, InMemorySettings, InMemoryStateStore};
//!
//! let pipeline = EchoPipeline::new(
//!     Arc::new(InMemorySettings::default()),
//!     audio,     // Arc<dyn AudioSink>
//!     notifier,  // Arc<dyn NotificationSink>
//!     Arc::new(InMemoryStateStore::new()),
//! );
//!
//! // Push console output as it arrives, from any thread.
//! pipeline.on_text("Exception in thread \"main\" java.lang.NullPointerException\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod achievements;
pub mod detector;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod identity;
pub mod pipeline;
pub mod settings;
pub mod storage;
pub mod voice;

// Re-export primary types at crate root for convenience
pub use achievements::{
    Achievement, AchievementCatalog, AchievementEngine, AchievementProgress, AchievementTier,
    RecordOutcome, TOTAL_KEY,
};
pub use detector::{DedupSlot, DetectionEvent, DetectionSink, DetectorConfig, StreamDetector};
pub use dispatch::{
    AudioSink, DispatchGuards, DispatchOutcome, DispatcherConfig, NotificationSink,
    TriggerDispatcher,
};
pub use error::{ConfigError, CueError, FaultlineError, FaultlineResult};
pub use events::{EventHub, EventStream, PipelineEvent};
pub use identity::{ExceptionIdentity, IdentityResolver, ThrowableIndex};
pub use pipeline::{EchoPipeline, PipelineConfig};
pub use settings::{CueSettings, InMemorySettings, SettingsProvider};
pub use storage::{InMemoryStateStore, JsonStateStore, PersistedState, StateStore, StorageError};
pub use voice::{pack_for, CueAsset, PackVariant, VoicePack};
