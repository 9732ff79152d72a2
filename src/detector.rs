//! Stream detection: scanning console text for exception mentions.
//!
//! One detector instance serves every observed process. Arriving chunks are
//! scanned for the first exception-like token; the token is resolved to a
//! canonical identity and passed through a short-window de-duplication
//! filter shared across all streams before a `DetectionEvent` is emitted to
//! the registered sinks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::FaultlineResult;
use crate::identity::{ExceptionIdentity, IdentityResolver};

/// Word characters followed by `Exception` or `Error` as a whole word.
/// Greedy `\w+` yields the longest token; only the first match per chunk is
/// considered, bounding cost per chunk.
const TOKEN_PATTERN: &str = r"\b\w+(?:Exception|Error)\b";

static COMPILED_TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();

fn token_pattern() -> &'static Regex {
    COMPILED_TOKEN_PATTERN
        .get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"))
}

/// Detector configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Two detections of the same simple name closer together than this are
    /// collapsed into one (handles multi-line duplicate console echoes of a
    /// single stack trace).
    pub dedup_window: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            dedup_window: Duration::from_millis(3000),
        }
    }
}

/// One accepted, de-duplicated recognition of an exception mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Unique id of this event.
    pub event_id: Uuid,
    /// The resolved identity.
    pub identity: ExceptionIdentity,
    /// When the detection was accepted.
    pub timestamp: DateTime<Utc>,
}

impl DetectionEvent {
    /// Creates an event for a freshly accepted detection.
    #[must_use]
    pub fn new(identity: ExceptionIdentity) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            identity,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug)]
struct LastDetection {
    simple_name: String,
    at: Instant,
}

/// Shared (last processed name, time) slot used for de-duplication.
///
/// A single slot serves every concurrently observed stream. Races between
/// streams resolve last-writer-wins; duplicate suppression is a best-effort
/// heuristic, and two genuinely simultaneous distinct exceptions may each
/// pass through. Constructed by the caller and injected so tests can
/// isolate instances.
#[derive(Debug, Default)]
pub struct DedupSlot {
    last: Mutex<Option<LastDetection>>,
}

impl DedupSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a detection of `simple_name` should pass, updating
    /// the slot. Returns false when the same name was admitted less than
    /// `window` ago.
    pub fn admit(&self, simple_name: &str, window: Duration) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(prev) = last.as_ref() {
            if prev.simple_name == simple_name && now.duration_since(prev.at) < window {
                return false;
            }
        }

        *last = Some(LastDetection {
            simple_name: simple_name.to_string(),
            at: now,
        });
        true
    }

    /// Forgets the last admitted detection.
    pub fn clear(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Consumer of detection events.
///
/// Sinks are invoked synchronously, in registration order, on the thread
/// that delivered the chunk. A sink error is logged and never prevents the
/// remaining sinks from observing the same event.
pub trait DetectionSink: Send + Sync {
    /// Handle one accepted detection.
    fn on_detection(&self, event: &DetectionEvent) -> FaultlineResult<()>;
}

/// Scans arriving console text and emits detection events.
pub struct StreamDetector {
    resolver: IdentityResolver,
    dedup: Arc<DedupSlot>,
    cfg: DetectorConfig,
    sinks: Vec<Arc<dyn DetectionSink>>,
    suppressed: AtomicU64,
}

impl StreamDetector {
    /// Creates a detector over the given resolver, shared dedup slot, and
    /// sinks.
    #[must_use]
    pub fn new(
        resolver: IdentityResolver,
        dedup: Arc<DedupSlot>,
        cfg: DetectorConfig,
        sinks: Vec<Arc<dyn DetectionSink>>,
    ) -> Self {
        Self {
            resolver,
            dedup,
            cfg,
            sinks,
            suppressed: AtomicU64::new(0),
        }
    }

    /// Processes one chunk of console output.
    ///
    /// May be called from any thread, at any time. Empty and blank chunks
    /// are no-ops. Matches are chunk-local; a token split across two chunks
    /// is not detected.
    pub fn on_text(&self, chunk: &str) {
        if chunk.trim().is_empty() {
            return;
        }

        let Some(m) = token_pattern().find(chunk) else {
            return;
        };

        let token = m.as_str();
        let Some(identity) = self.resolver.resolve(token) else {
            trace!(token, "no namespace match for token");
            return;
        };

        if !self.dedup.admit(identity.simple_name(), self.cfg.dedup_window) {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            debug!(name = identity.simple_name(), "suppressed duplicate detection");
            return;
        }

        let event = DetectionEvent::new(identity);
        debug!(
            name = event.identity.simple_name(),
            canonical = event.identity.canonical_name(),
            "detection event"
        );

        for sink in &self.sinks {
            if let Err(err) = sink.on_detection(&event) {
                warn!(error = %err, "detection sink failed");
            }
        }
    }

    /// Notes that an observed process terminated. Delivered once per
    /// process by the lifecycle collaborator.
    pub fn on_process_terminated(&self, exit_code: Option<i32>) {
        debug!(?exit_code, "observed process terminated");
    }

    /// Detections discarded by the de-duplication filter.
    #[must_use]
    pub fn suppressed_duplicates(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}
