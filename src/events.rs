//! Pipeline event fan-out for UI collaborators.
//!
//! Subscribers get a bounded stream of pipeline events (detections, cue
//! dispatches, unlocks). Publishing never blocks the detection path: a slow
//! or abandoned subscriber loses events, and the hub counts the drops.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::achievements::Achievement;
use crate::detector::DetectionEvent;
use crate::dispatch::DispatchOutcome;
use crate::error::{FaultlineError, FaultlineResult};
use crate::identity::ExceptionIdentity;

/// Something observable happened in the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A detection was accepted.
    Detection {
        /// The accepted event.
        event: DetectionEvent,
    },

    /// The dispatcher resolved a cue request.
    CueDispatched {
        /// Identity the cue was requested for.
        identity: ExceptionIdentity,
        /// How the request was resolved.
        outcome: DispatchOutcome,
    },

    /// An achievement was unlocked.
    AchievementUnlocked {
        /// The freshly unlocked achievement.
        achievement: Achievement,
    },
}

/// Fan-out hub for [`PipelineEvent`]s.
#[derive(Debug)]
pub struct EventHub {
    subscribers: Mutex<Vec<Sender<PipelineEvent>>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl EventHub {
    /// Creates a hub whose subscriber streams buffer up to `capacity`
    /// events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    /// Registers a new subscriber stream.
    pub fn subscribe(&self) -> EventStream {
        let (tx, rx) = bounded(self.capacity);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        EventStream { rx }
    }

    /// Publishes an event to every live subscriber.
    ///
    /// Never blocks: full or disconnected subscribers drop the event.
    /// Disconnected subscribers are pruned on the way through.
    pub fn publish(&self, event: &PipelineEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        });
    }

    /// Events lost to full or disconnected subscribers.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A subscription stream of pipeline events.
///
/// Dropping the stream unsubscribes; the hub prunes it on the next publish.
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<PipelineEvent>,
}

impl EventStream {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> FaultlineResult<PipelineEvent> {
        self.rx.recv().map_err(|_| FaultlineError::StreamDisconnected)
    }

    /// Receive the next event with a timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> FaultlineResult<PipelineEvent> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => FaultlineError::StreamTimeout {
                duration_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            },
            RecvTimeoutError::Disconnected => FaultlineError::StreamDisconnected,
        })
    }

    /// Receive without blocking; `None` when no event is pending.
    #[must_use]
    pub fn try_recv(&self) -> Option<PipelineEvent> {
        self.rx.try_recv().ok()
    }
}
