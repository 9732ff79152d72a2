//! Per-key achievement progress view.

use serde::{Deserialize, Serialize};

use crate::achievements::catalog::Achievement;

/// Read-only progress for one counter key: current count plus the ladder of
/// achievements sharing that key, ordered by threshold ascending. Computed
/// on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementProgress {
    key: String,
    current_count: u64,
    achievements: Vec<Achievement>,
}

impl AchievementProgress {
    /// Builds a view. `achievements` must already be ordered by threshold
    /// ascending (the engine query guarantees this).
    #[must_use]
    pub fn new(key: impl Into<String>, current_count: u64, achievements: Vec<Achievement>) -> Self {
        Self {
            key: key.into(),
            current_count,
            achievements,
        }
    }

    /// The counter key this view describes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current occurrence count for the key.
    #[must_use]
    pub const fn current_count(&self) -> u64 {
        self.current_count
    }

    /// The full ladder for the key, threshold ascending.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    /// The next achievement to unlock: first locked rung in the ladder.
    #[must_use]
    pub fn next_achievement(&self) -> Option<&Achievement> {
        self.achievements.iter().find(|a| !a.is_unlocked())
    }

    /// The highest rung already unlocked.
    #[must_use]
    pub fn last_unlocked(&self) -> Option<&Achievement> {
        self.achievements.iter().filter(|a| a.is_unlocked()).last()
    }

    /// Progress toward the next rung, 0-100.
    ///
    /// 100 when every rung is unlocked, and 100 when the next threshold
    /// equals the last unlocked one (degenerate ladder), avoiding a zero
    /// divisor.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percentage(&self) -> f64 {
        let Some(next) = self.next_achievement() else {
            return 100.0;
        };

        let base = self.last_unlocked().map_or(0, |a| a.required_count);
        let target = next.required_count;
        if target == base {
            return 100.0;
        }

        let progressed = self.current_count as f64 - base as f64;
        let span = target as f64 - base as f64;
        (progressed / span * 100.0).min(100.0)
    }
}
