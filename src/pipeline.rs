//! Pipeline facade: wires the detector, dispatcher, and achievement engine.
//!
//! Construction is plain dependency injection; every piece of shared state
//! (dedup slot, dispatch guards, event hub) is created here and handed to
//! the components that need it, so separate pipelines are fully isolated.

use std::sync::Arc;

use tracing::info;

use crate::achievements::{AchievementCatalog, AchievementEngine};
use crate::detector::{DedupSlot, DetectionEvent, DetectionSink, DetectorConfig, StreamDetector};
use crate::dispatch::{
    AudioSink, DispatchGuards, DispatchOutcome, DispatcherConfig, NotificationSink,
    TriggerDispatcher,
};
use crate::error::FaultlineResult;
use crate::events::{EventHub, EventStream, PipelineEvent};
use crate::identity::IdentityResolver;
use crate::settings::SettingsProvider;
use crate::storage::StateStore;

/// Pipeline-wide configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Detector configuration.
    pub detector: DetectorConfig,
    /// Dispatcher configuration.
    pub dispatcher: DispatcherConfig,
    /// Per-subscriber event stream capacity.
    pub event_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            dispatcher: DispatcherConfig::default(),
            event_capacity: 1024,
        }
    }
}

/// The exception echo pipeline.
///
/// One instance serves every observed process: chunks from all of them are
/// pushed through [`EchoPipeline::on_text`], and the shared dedup/guard
/// state arbitrates between them.
pub struct EchoPipeline {
    detector: StreamDetector,
    dispatcher: Arc<TriggerDispatcher>,
    engine: Arc<AchievementEngine>,
    events: Arc<EventHub>,
}

impl EchoPipeline {
    /// Creates a pipeline with the default resolver, the built-in
    /// achievement catalog, and default configuration.
    #[must_use]
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        audio: Arc<dyn AudioSink>,
        notifier: Arc<dyn NotificationSink>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self::with_config(
            PipelineConfig::default(),
            IdentityResolver::default(),
            AchievementCatalog::builtin(),
            settings,
            audio,
            notifier,
            store,
        )
    }

    /// Creates a fully customized pipeline.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn with_config(
        cfg: PipelineConfig,
        resolver: IdentityResolver,
        catalog: AchievementCatalog,
        settings: Arc<dyn SettingsProvider>,
        audio: Arc<dyn AudioSink>,
        notifier: Arc<dyn NotificationSink>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        let events = Arc::new(EventHub::new(cfg.event_capacity));

        let dispatcher = Arc::new(TriggerDispatcher::new(
            cfg.dispatcher,
            Arc::new(DispatchGuards::new()),
            settings,
            audio,
            notifier,
        ));
        let engine = Arc::new(AchievementEngine::new(catalog, store));

        // Both consumers see every accepted detection; the detector
        // isolates a failure in one from the other.
        let sinks: Vec<Arc<dyn DetectionSink>> = vec![
            Arc::new(ObserveSink {
                events: Arc::clone(&events),
            }),
            Arc::new(CueSink {
                dispatcher: Arc::clone(&dispatcher),
                events: Arc::clone(&events),
            }),
            Arc::new(RecordSink {
                engine: Arc::clone(&engine),
                events: Arc::clone(&events),
            }),
        ];

        let detector = StreamDetector::new(
            resolver,
            Arc::new(DedupSlot::new()),
            cfg.detector,
            sinks,
        );

        info!("echo pipeline constructed");

        Self {
            detector,
            dispatcher,
            engine,
            events,
        }
    }

    /// Pushes one chunk of console output through the pipeline. Safe from
    /// any thread, at any time.
    pub fn on_text(&self, chunk: &str) {
        self.detector.on_text(chunk);
    }

    /// Notes that an observed process terminated.
    pub fn on_process_terminated(&self, exit_code: Option<i32>) {
        self.detector.on_process_terminated(exit_code);
    }

    /// Clears the dispatcher's cooldown and busy guards. Call whenever the
    /// pack selection changes so a stale cooldown does not swallow the
    /// first cue under the new settings.
    pub fn reset_debounce(&self) {
        self.dispatcher.reset_debounce();
    }

    /// Subscribes to pipeline events.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    /// Read-only achievement and counter queries.
    #[must_use]
    pub fn achievements(&self) -> &AchievementEngine {
        &self.engine
    }

    /// Detections discarded by the de-duplication filter.
    #[must_use]
    pub fn suppressed_duplicates(&self) -> u64 {
        self.detector.suppressed_duplicates()
    }

    /// Events lost to slow or abandoned subscribers.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped_events()
    }
}

struct ObserveSink {
    events: Arc<EventHub>,
}

impl DetectionSink for ObserveSink {
    fn on_detection(&self, event: &DetectionEvent) -> FaultlineResult<()> {
        self.events.publish(&PipelineEvent::Detection {
            event: event.clone(),
        });
        Ok(())
    }
}

struct CueSink {
    dispatcher: Arc<TriggerDispatcher>,
    events: Arc<EventHub>,
}

impl DetectionSink for CueSink {
    fn on_detection(&self, event: &DetectionEvent) -> FaultlineResult<()> {
        let outcome = self.dispatcher.dispatch(&event.identity);
        if outcome == DispatchOutcome::Dispatched {
            self.events.publish(&PipelineEvent::CueDispatched {
                identity: event.identity.clone(),
                outcome,
            });
        }
        Ok(())
    }
}

struct RecordSink {
    engine: Arc<AchievementEngine>,
    events: Arc<EventHub>,
}

impl DetectionSink for RecordSink {
    fn on_detection(&self, event: &DetectionEvent) -> FaultlineResult<()> {
        let outcome = self.engine.record_exception(&event.identity);
        for achievement in outcome.newly_unlocked {
            self.events
                .publish(&PipelineEvent::AchievementUnlocked { achievement });
        }
        Ok(())
    }
}
