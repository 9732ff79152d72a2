//! Cue dispatch: serializing and rate-limiting the side effects of a
//! detection.
//!
//! Two guards are layered over each other. A cooldown rejects requests that
//! arrive too soon after the last accepted one (alert fatigue from bursty
//! exceptions); an atomic busy flag rejects a request while a previous cue
//! is still being started (overlapping playback from concurrently observed
//! processes). Losers are rejected immediately; nothing queues or blocks.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::CueError;
use crate::identity::ExceptionIdentity;
use crate::settings::SettingsProvider;
use crate::voice::{pack_for, CueAsset};

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Minimum time between two accepted dispatches.
    pub cooldown: Duration,
    /// Short fixed delay after starting playback, before the busy guard is
    /// released. This confirms the cue started; it is NOT a wait for
    /// playback completion, which would hold the guard for the full clip.
    pub start_confirm_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(6000),
            start_confirm_delay: Duration::from_millis(100),
        }
    }
}

/// Shared guard state: last accepted fire time and the busy flag.
///
/// Injected into the dispatcher so tests can instantiate isolated guard
/// sets instead of sharing process globals.
#[derive(Debug, Default)]
pub struct DispatchGuards {
    /// Epoch milliseconds of the last accepted dispatch; 0 = never.
    last_fire_ms: AtomicI64,
    busy: AtomicBool,
}

impl DispatchGuards {
    /// Creates cleared guards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears both guards unconditionally.
    pub fn reset(&self) {
        self.last_fire_ms.store(0, Ordering::Release);
        self.busy.store(false, Ordering::Release);
    }
}

struct BusyRelease<'a>(&'a AtomicBool);

impl Drop for BusyRelease<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Outcome of a dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The cue was handed to the collaborators (delivery itself is
    /// best-effort).
    Dispatched,
    /// Rejected: inside the cooldown window.
    Cooldown,
    /// Rejected: a previous cue is still being started.
    Busy,
    /// Accepted, but both cue channels are disabled in settings. Cooldown
    /// and busy state were already consumed.
    Disabled,
}

/// Starts audio playback for a cue asset.
///
/// Implementations start playback and return; they must not block for the
/// full clip duration. `volume` is the effective playback volume, 50-100.
pub trait AudioSink: Send + Sync {
    /// Begin playing the asset. Errors are recovered by the dispatcher.
    fn play(&self, asset: &CueAsset, volume: u8) -> Result<(), CueError>;
}

/// Shows a notification line for a detection.
pub trait NotificationSink: Send + Sync {
    /// Display the line. Errors are recovered by the dispatcher.
    fn notify(&self, identity: &ExceptionIdentity, line: &str) -> Result<(), CueError>;
}

/// Serializes detection events into at most one in-flight cue.
pub struct TriggerDispatcher {
    cfg: DispatcherConfig,
    guards: Arc<DispatchGuards>,
    settings: Arc<dyn SettingsProvider>,
    audio: Arc<dyn AudioSink>,
    notifier: Arc<dyn NotificationSink>,
}

impl TriggerDispatcher {
    /// Creates a dispatcher over shared guards and the cue collaborators.
    #[must_use]
    pub fn new(
        cfg: DispatcherConfig,
        guards: Arc<DispatchGuards>,
        settings: Arc<dyn SettingsProvider>,
        audio: Arc<dyn AudioSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            cfg,
            guards,
            settings,
            audio,
            notifier,
        }
    }

    /// Requests a cue for the identity.
    ///
    /// Never blocks waiting for a guard: callers racing an in-flight cue
    /// are rejected immediately. Collaborator failures are logged and do
    /// not propagate.
    pub fn dispatch(&self, identity: &ExceptionIdentity) -> DispatchOutcome {
        let now_ms = Utc::now().timestamp_millis();
        let last_ms = self.guards.last_fire_ms.load(Ordering::Acquire);
        #[allow(clippy::cast_possible_truncation)]
        let cooldown_ms = self.cfg.cooldown.as_millis() as i64;

        if now_ms - last_ms < cooldown_ms {
            debug!(
                name = identity.simple_name(),
                since_ms = now_ms - last_ms,
                "cue request rejected by cooldown"
            );
            return DispatchOutcome::Cooldown;
        }

        if self
            .guards
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(name = identity.simple_name(), "cue already in flight, rejected");
            return DispatchOutcome::Busy;
        }

        // Released on every exit path below, including panics in
        // collaborators.
        let _release = BusyRelease(&self.guards.busy);

        // Close the cooldown window before doing any work.
        self.guards.last_fire_ms.store(now_ms, Ordering::Release);

        let settings = self.settings.cue_settings();
        if !settings.sound_enabled && !settings.notification_enabled {
            debug!("cues disabled in settings");
            return DispatchOutcome::Disabled;
        }

        let pack = pack_for(settings.pack);

        if settings.sound_enabled {
            let asset = pack.sound_for(identity);
            let volume = effective_volume(settings.volume);
            debug!(
                asset = %asset,
                volume,
                pack = %settings.pack,
                "starting cue playback"
            );
            if let Err(err) = self.audio.play(&asset, volume) {
                warn!(error = %err, asset = %asset, "cue playback failed");
            }
        }

        if settings.notification_enabled {
            let line = pack.line_for(identity);
            if let Err(err) = self.notifier.notify(identity, line) {
                warn!(error = %err, "cue notification failed");
            }
        }

        // Confirm the cue had time to start before allowing the next one.
        thread::sleep(self.cfg.start_confirm_delay);

        DispatchOutcome::Dispatched
    }

    /// Clears the cooldown and busy guards unconditionally.
    ///
    /// Expected whenever the pack selection changes, so a stale cooldown
    /// does not swallow the first cue under the new settings.
    pub fn reset_debounce(&self) {
        self.guards.reset();
        debug!("dispatch guards reset");
    }
}

/// Remaps the raw 0-100 control range onto the effective 50-100 playback
/// range.
#[must_use]
fn effective_volume(raw: u8) -> u8 {
    let raw = u32::from(raw.min(100));
    #[allow(clippy::cast_possible_truncation)]
    {
        (50 + raw * 50 / 100) as u8
    }
}
