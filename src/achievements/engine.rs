//! The achievement engine: counters, threshold evaluation, persistence.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::achievements::catalog::{Achievement, AchievementCatalog, TOTAL_KEY};
use crate::achievements::progress::AchievementProgress;
use crate::identity::ExceptionIdentity;
use crate::storage::{PersistedState, StateStore};

/// Result of recording one detection.
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    /// New count for the recorded identity's key.
    pub count: u64,
    /// Recomputed total across all keys.
    pub total: u64,
    /// Achievements unlocked by this detection, if any.
    pub newly_unlocked: Vec<Achievement>,
}

/// Tracks occurrence counters and unlocks achievements against a fixed
/// catalog.
///
/// In-memory state is the source of truth for the current run; the durable
/// snapshot is refreshed after every recorded detection and read back once
/// at construction. Persistence failures are logged and never roll back
/// in-memory state.
pub struct AchievementEngine {
    achievements: RwLock<HashMap<String, Achievement>>,
    counters: RwLock<HashMap<String, u64>>,
    store: Arc<dyn StateStore>,
}

impl AchievementEngine {
    /// Creates an engine over the catalog, reconciling any previously
    /// persisted snapshot into it by achievement id. Catalog entries absent
    /// from the snapshot stay locked; a failed load falls back to defaults.
    #[must_use]
    pub fn new(catalog: AchievementCatalog, store: Arc<dyn StateStore>) -> Self {
        let mut achievements: HashMap<String, Achievement> = catalog
            .into_achievements()
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect();
        let mut counters = HashMap::new();

        match store.load() {
            Ok(Some(state)) => {
                counters = state.counters;

                for achievement in achievements.values_mut() {
                    let unlocked = state
                        .unlocked_achievements
                        .get(&achievement.id)
                        .copied()
                        .unwrap_or(false);
                    if unlocked {
                        let at = state
                            .achievement_unlock_times
                            .get(&achievement.id)
                            .copied()
                            .filter(|ms| *ms > 0)
                            .and_then(DateTime::from_timestamp_millis);
                        achievement.restore(true, at);
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "failed to load achievement state, starting fresh");
            }
        }

        Self {
            achievements: RwLock::new(achievements),
            counters: RwLock::new(counters),
            store,
        }
    }

    /// Records one detection for the identity.
    ///
    /// Increments the per-key counter, recomputes TOTAL as the sum over all
    /// other keys, evaluates both ladders, and persists the snapshot
    /// unconditionally.
    pub fn record_exception(&self, identity: &ExceptionIdentity) -> RecordOutcome {
        let key = identity.simple_name().to_string();

        let (count, total) = {
            let mut counters = self
                .counters
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            let entry = counters.entry(key.clone()).or_insert(0);
            *entry += 1;
            let count = *entry;

            // Full recomputation rather than an increment, so TOTAL
            // self-corrects and always equals the sum of the other keys.
            let total: u64 = counters
                .iter()
                .filter(|(k, _)| k.as_str() != TOTAL_KEY)
                .map(|(_, v)| *v)
                .sum();
            counters.insert(TOTAL_KEY.to_string(), total);

            (count, total)
        };

        info!(name = %key, count, total, "recorded exception");

        let now = Utc::now();
        let newly_unlocked = {
            let mut achievements = self
                .achievements
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            let mut unlocked = Vec::new();
            for achievement in achievements.values_mut() {
                let value = if achievement.counter_key == key {
                    count
                } else if achievement.counter_key == TOTAL_KEY {
                    total
                } else {
                    continue;
                };

                if !achievement.is_unlocked() && value >= achievement.required_count {
                    achievement.unlock(now);
                    info!(
                        id = %achievement.id,
                        name = %achievement.name,
                        tier = %achievement.tier,
                        "achievement unlocked"
                    );
                    unlocked.push(achievement.clone());
                }
            }
            unlocked
        };

        self.persist();

        RecordOutcome {
            count,
            total,
            newly_unlocked,
        }
    }

    /// Current count for a key (exception simple name or [`TOTAL_KEY`]).
    #[must_use]
    pub fn exception_count(&self, key: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// All counters, including the TOTAL entry.
    #[must_use]
    pub fn exception_counts(&self) -> HashMap<String, u64> {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every achievement in the catalog, in no particular order.
    #[must_use]
    pub fn all_achievements(&self) -> Vec<Achievement> {
        self.achievements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Unlocked achievements, most recently unlocked first.
    #[must_use]
    pub fn unlocked_achievements(&self) -> Vec<Achievement> {
        let mut unlocked: Vec<Achievement> = self
            .achievements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|a| a.is_unlocked())
            .cloned()
            .collect();
        unlocked.sort_by_key(|a| Reverse(a.unlocked_at()));
        unlocked
    }

    /// Locked achievements, threshold ascending.
    #[must_use]
    pub fn locked_achievements(&self) -> Vec<Achievement> {
        let mut locked: Vec<Achievement> = self
            .achievements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|a| !a.is_unlocked())
            .cloned()
            .collect();
        locked.sort_by_key(|a| a.required_count);
        locked
    }

    /// Progress view for one key: current count plus the ladder sharing
    /// that key, threshold ascending.
    #[must_use]
    pub fn achievement_progress(&self, key: &str) -> AchievementProgress {
        let current = self.exception_count(key);
        let mut ladder: Vec<Achievement> = self
            .achievements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|a| a.counter_key == key)
            .cloned()
            .collect();
        ladder.sort_by_key(|a| a.required_count);
        AchievementProgress::new(key, current, ladder)
    }

    fn snapshot(&self) -> PersistedState {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut unlocked_achievements = HashMap::new();
        let mut achievement_unlock_times = HashMap::new();
        for achievement in self
            .achievements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            if achievement.is_unlocked() {
                unlocked_achievements.insert(achievement.id.clone(), true);
                achievement_unlock_times.insert(
                    achievement.id.clone(),
                    achievement
                        .unlocked_at()
                        .map_or(0, |at| at.timestamp_millis()),
                );
            }
        }

        PersistedState {
            counters,
            unlocked_achievements,
            achievement_unlock_times,
        }
    }

    fn persist(&self) {
        let state = self.snapshot();
        if let Err(err) = self.store.save(&state) {
            warn!(error = %err, "failed to persist achievement state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::catalog::AchievementTier;
    use crate::identity::IdentityResolver;
    use crate::storage::{InMemoryStateStore, StorageError};

    fn identity(name: &str) -> ExceptionIdentity {
        IdentityResolver::default().resolve(name).unwrap()
    }

    fn ladder_catalog() -> AchievementCatalog {
        AchievementCatalog::new(vec![
            Achievement::new(
                "npe_1",
                "First",
                "d",
                "*",
                AchievementTier::Bronze,
                1,
                "NullPointerException",
            ),
            Achievement::new(
                "npe_10",
                "Tenth",
                "d",
                "*",
                AchievementTier::Silver,
                10,
                "NullPointerException",
            ),
            Achievement::new(
                "npe_50",
                "Fiftieth",
                "d",
                "*",
                AchievementTier::Gold,
                50,
                "NullPointerException",
            ),
            Achievement::new(
                "npe_100",
                "Hundredth",
                "d",
                "*",
                AchievementTier::Platinum,
                100,
                "NullPointerException",
            ),
            Achievement::new(
                "total_3",
                "Three anywhere",
                "d",
                "*",
                AchievementTier::Diamond,
                3,
                TOTAL_KEY,
            ),
        ])
        .unwrap()
    }

    fn engine() -> AchievementEngine {
        AchievementEngine::new(ladder_catalog(), Arc::new(InMemoryStateStore::new()))
    }

    #[test]
    fn counts_increase_by_one_per_event() {
        let engine = engine();
        let npe = identity("NullPointerException");

        for expected in 1..=5 {
            let outcome = engine.record_exception(&npe);
            assert_eq!(outcome.count, expected);
        }
        assert_eq!(engine.exception_count("NullPointerException"), 5);
    }

    #[test]
    fn total_equals_sum_of_other_keys_after_every_record() {
        let engine = engine();

        for _ in 0..3 {
            engine.record_exception(&identity("NullPointerException"));
            engine.record_exception(&identity("IOException"));

            let counts = engine.exception_counts();
            let sum: u64 = counts
                .iter()
                .filter(|(k, _)| k.as_str() != TOTAL_KEY)
                .map(|(_, v)| *v)
                .sum();
            assert_eq!(counts.get(TOTAL_KEY).copied().unwrap_or(0), sum);
        }
    }

    #[test]
    fn ten_occurrences_unlock_thresholds_up_to_ten_exactly_once() {
        let engine = engine();
        let npe = identity("NullPointerException");

        let mut all_unlocked = Vec::new();
        for _ in 0..10 {
            all_unlocked.extend(engine.record_exception(&npe).newly_unlocked);
        }

        let mut ids: Vec<String> = all_unlocked.iter().map(|a| a.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["npe_1", "npe_10", "total_3"]);

        // Unlock timestamps never change after the first crossing.
        let first_at = engine
            .all_achievements()
            .into_iter()
            .find(|a| a.id == "npe_1")
            .unwrap()
            .unlocked_at()
            .unwrap();
        engine.record_exception(&npe);
        let after = engine
            .all_achievements()
            .into_iter()
            .find(|a| a.id == "npe_1")
            .unwrap()
            .unlocked_at()
            .unwrap();
        assert_eq!(first_at, after);
    }

    #[test]
    fn query_ordering_contracts() {
        let engine = engine();
        let npe = identity("NullPointerException");
        for _ in 0..10 {
            engine.record_exception(&npe);
        }

        let locked = engine.locked_achievements();
        let thresholds: Vec<u64> = locked.iter().map(|a| a.required_count).collect();
        let mut ascending = thresholds.clone();
        ascending.sort_unstable();
        assert_eq!(thresholds, ascending);

        let unlocked = engine.unlocked_achievements();
        assert!(!unlocked.is_empty());
        for pair in unlocked.windows(2) {
            assert!(pair[0].unlocked_at() >= pair[1].unlocked_at());
        }
    }

    #[test]
    fn progress_view_exposes_ladder_and_next() {
        let engine = engine();
        let npe = identity("NullPointerException");
        for _ in 0..5 {
            engine.record_exception(&npe);
        }

        let progress = engine.achievement_progress("NullPointerException");
        assert_eq!(progress.current_count(), 5);
        assert_eq!(progress.next_achievement().unwrap().id, "npe_10");
        let pct = progress.progress_percentage();
        assert!((pct - (4.0 / 9.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn state_reconciles_across_restart() {
        let store = Arc::new(InMemoryStateStore::new());

        {
            let engine = AchievementEngine::new(ladder_catalog(), store.clone());
            let npe = identity("NullPointerException");
            for _ in 0..10 {
                engine.record_exception(&npe);
            }
        }

        let reborn = AchievementEngine::new(ladder_catalog(), store);
        assert_eq!(reborn.exception_count("NullPointerException"), 10);
        assert_eq!(reborn.exception_count(TOTAL_KEY), 10);

        let unlocked: Vec<String> = reborn
            .unlocked_achievements()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert!(unlocked.contains(&"npe_1".to_string()));
        assert!(unlocked.contains(&"npe_10".to_string()));
        assert!(!unlocked.contains(&"npe_50".to_string()));
    }

    #[test]
    fn snapshot_entries_unknown_to_catalog_are_ignored() {
        let mut state = PersistedState::default();
        state.counters.insert("IOException".to_string(), 4);
        state
            .unlocked_achievements
            .insert("gone_from_catalog".to_string(), true);

        let engine = AchievementEngine::new(
            ladder_catalog(),
            Arc::new(InMemoryStateStore::with_state(state)),
        );

        assert_eq!(engine.exception_count("IOException"), 4);
        assert!(engine.unlocked_achievements().is_empty());
    }

    #[test]
    fn persistence_failure_keeps_in_memory_state() {
        struct FailingStore;

        impl StateStore for FailingStore {
            fn load(&self) -> Result<Option<PersistedState>, StorageError> {
                Err(StorageError::BackendError("no disk".to_string()))
            }

            fn save(&self, _state: &PersistedState) -> Result<(), StorageError> {
                Err(StorageError::BackendError("still no disk".to_string()))
            }
        }

        let engine = AchievementEngine::new(ladder_catalog(), Arc::new(FailingStore));
        let outcome = engine.record_exception(&identity("NullPointerException"));

        assert_eq!(outcome.count, 1);
        assert_eq!(engine.exception_count("NullPointerException"), 1);
        assert!(!engine.unlocked_achievements().is_empty());
    }

    #[test]
    fn concurrent_records_keep_exact_per_key_counts() {
        let engine = Arc::new(engine());
        let mut handles = Vec::new();

        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    engine.record_exception(&identity("NullPointerException"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(engine.exception_count("NullPointerException"), 100);
        assert_eq!(engine.exception_count(TOTAL_KEY), 100);

        // The full ladder unlocked exactly once each.
        let unlocked: Vec<String> = engine
            .unlocked_achievements()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(unlocked.len(), 5);
    }
}
