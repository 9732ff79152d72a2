//! Achievement definitions and the built-in catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reserved counter key aggregating every tracked exception.
pub const TOTAL_KEY: &str = "TOTAL";

/// Rarity tier, ordered from most to least common.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTier {
    /// Common
    Bronze,
    /// Uncommon
    Silver,
    /// Rare
    Gold,
    /// Epic
    Platinum,
    /// Legendary
    Diamond,
    /// Mythic
    Rainbow,
}

impl AchievementTier {
    /// Display name of the tier.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
            Self::Diamond => "Diamond",
            Self::Rainbow => "Rainbow",
        }
    }

    /// Rarity label of the tier.
    #[must_use]
    pub const fn rarity(&self) -> &'static str {
        match self {
            Self::Bronze => "Common",
            Self::Silver => "Uncommon",
            Self::Gold => "Rare",
            Self::Platinum => "Epic",
            Self::Diamond => "Legendary",
            Self::Rainbow => "Mythic",
        }
    }

    /// Hex color used by UI collaborators.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Bronze => "#CD7F32",
            Self::Silver => "#C0C0C0",
            Self::Gold => "#FFD700",
            Self::Platinum => "#E5E4E2",
            Self::Diamond => "#B9F2FF",
            Self::Rainbow => "#FF6B6B",
        }
    }
}

impl std::fmt::Display for AchievementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One unlockable achievement.
///
/// Identity is the `id`; equality and hashing use it alone. The unlock flag
/// and timestamp mutate monotonically from locked/never to unlocked/set and
/// never revert; the timestamp is written exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    /// Unique id, stable across runs (persistence key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Flavor description.
    pub description: String,
    /// Icon glyph for UI collaborators.
    pub icon: String,
    /// Rarity tier.
    pub tier: AchievementTier,
    /// Counter key this achievement watches: an exception simple name or
    /// [`TOTAL_KEY`].
    pub counter_key: String,
    /// Occurrences required to unlock.
    pub required_count: u64,

    unlocked: bool,
    unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Creates a locked achievement.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        tier: AchievementTier,
        required_count: u64,
        counter_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            tier,
            counter_key: counter_key.into(),
            required_count,
            unlocked: false,
            unlocked_at: None,
        }
    }

    /// Whether this achievement has been unlocked.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// When the achievement was first unlocked, if ever.
    #[must_use]
    pub const fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
    }

    /// Marks the achievement unlocked. The timestamp is set on the first
    /// unlock only and never overwritten.
    pub(crate) fn unlock(&mut self, at: DateTime<Utc>) {
        self.unlocked = true;
        if self.unlocked_at.is_none() {
            self.unlocked_at = Some(at);
        }
    }

    /// Restores unlock state from a persisted snapshot.
    pub(crate) fn restore(&mut self, unlocked: bool, at: Option<DateTime<Utc>>) {
        if unlocked {
            self.unlocked = true;
            if self.unlocked_at.is_none() {
                self.unlocked_at = at;
            }
        }
    }
}

impl PartialEq for Achievement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Achievement {}

impl std::hash::Hash for Achievement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A validated set of achievement definitions, fixed at engine
/// construction.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    achievements: Vec<Achievement>,
}

impl AchievementCatalog {
    /// Builds a catalog from explicit definitions.
    ///
    /// # Errors
    /// - `DuplicateAchievementId`: two definitions share an id
    /// - `ZeroThreshold`: a definition requires zero occurrences
    pub fn new(achievements: Vec<Achievement>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for a in &achievements {
            if !seen.insert(a.id.as_str()) {
                return Err(ConfigError::DuplicateAchievementId { id: a.id.clone() });
            }
            if a.required_count == 0 {
                return Err(ConfigError::ZeroThreshold { id: a.id.clone() });
            }
        }
        Ok(Self { achievements })
    }

    /// The built-in product catalog: an ascending ladder per tracked
    /// exception plus three TOTAL milestones at the highest tiers.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn builtin() -> Self {
        use AchievementTier::{Bronze, Diamond, Gold, Platinum, Rainbow, Silver};

        let mut defs = Vec::new();
        let mut add = |id: &str,
                       name: &str,
                       description: &str,
                       icon: &str,
                       tier: AchievementTier,
                       required: u64,
                       key: &str| {
            defs.push(Achievement::new(
                id,
                name,
                description,
                icon,
                tier,
                required,
                key,
            ));
        };

        // NullPointerException
        add(
            "npe_1",
            "Into the Void",
            "Your first NullPointerException.",
            "\u{1f480}",
            Bronze,
            1,
            "NullPointerException",
        );
        add(
            "npe_10",
            "Void Walker",
            "10 NullPointerExceptions. You and nothing are getting acquainted.",
            "\u{1f47b}",
            Silver,
            10,
            "NullPointerException",
        );
        add(
            "npe_50",
            "Null Whisperer",
            "50 NullPointerExceptions. The void whispers back now.",
            "\u{1f451}",
            Gold,
            50,
            "NullPointerException",
        );
        add(
            "npe_100",
            "Lord of Nothing",
            "100 NullPointerExceptions. Absence bows to you.",
            "\u{1f3c6}",
            Platinum,
            100,
            "NullPointerException",
        );

        // ArrayIndexOutOfBoundsException
        add(
            "oob_1",
            "Off the Edge",
            "Your first step past the end of an array.",
            "\u{1f3af}",
            Bronze,
            1,
            "ArrayIndexOutOfBoundsException",
        );
        add(
            "oob_10",
            "Boundary Scout",
            "10 out-of-bounds reads. The fence keeps moving, surely.",
            "\u{1f5fa}\u{fe0f}",
            Silver,
            10,
            "ArrayIndexOutOfBoundsException",
        );
        add(
            "oob_50",
            "Cartographer of Nowhere",
            "50 out-of-bounds reads. You map memory no one owns.",
            "\u{1f680}",
            Gold,
            50,
            "ArrayIndexOutOfBoundsException",
        );

        // ArithmeticException
        add(
            "arith_1",
            "Divided We Fall",
            "Your first division by zero.",
            "\u{1f9ee}",
            Bronze,
            1,
            "ArithmeticException",
        );
        add(
            "arith_10",
            "Calculated Risk",
            "10 arithmetic mishaps. The numbers are filing complaints.",
            "\u{1f525}",
            Silver,
            10,
            "ArithmeticException",
        );
        add(
            "arith_50",
            "Math Has Left the Chat",
            "50 arithmetic mishaps. Mathematics requests a restraining order.",
            "\u{1f4a5}",
            Gold,
            50,
            "ArithmeticException",
        );

        // NumberFormatException
        add(
            "numfmt_1",
            "Not a Number",
            "Your first failed parse.",
            "\u{1f4dd}",
            Bronze,
            1,
            "NumberFormatException",
        );
        add(
            "numfmt_10",
            "Parse of No Return",
            "10 failed parses. Strings are not numbers, still.",
            "\u{26a1}",
            Silver,
            10,
            "NumberFormatException",
        );

        // IllegalArgumentException
        add(
            "arg_1",
            "Bad Arguments",
            "Your first illegal argument.",
            "\u{1f6ab}",
            Bronze,
            1,
            "IllegalArgumentException",
        );
        add(
            "arg_10",
            "Argument Clinic",
            "10 illegal arguments. This is abuse, not an argument.",
            "\u{1f576}\u{fe0f}",
            Silver,
            10,
            "IllegalArgumentException",
        );

        // IOException
        add(
            "io_1",
            "Stream Crossed",
            "Your first I/O failure.",
            "\u{1f4c1}",
            Bronze,
            1,
            "IOException",
        );
        add(
            "io_10",
            "Broken Pipes",
            "10 I/O failures. The file system has trust issues now.",
            "\u{1f5c2}\u{fe0f}",
            Silver,
            10,
            "IOException",
        );

        // ClassNotFoundException
        add(
            "cnf_1",
            "Missing in Action",
            "Your first missing class.",
            "\u{1f50d}",
            Bronze,
            1,
            "ClassNotFoundException",
        );
        add(
            "cnf_10",
            "Ghost Class Hunter",
            "10 missing classes. The classpath is a haunted place.",
            "\u{1f575}\u{fe0f}",
            Silver,
            10,
            "ClassNotFoundException",
        );

        // StackOverflowError
        add(
            "soe_1",
            "Base Case Optional",
            "Your first stack overflow.",
            "\u{1f4da}",
            Bronze,
            1,
            "StackOverflowError",
        );
        add(
            "soe_5",
            "Deeper Still",
            "5 stack overflows. Recursion is a lifestyle.",
            "\u{267e}\u{fe0f}",
            Silver,
            5,
            "StackOverflowError",
        );
        add(
            "soe_10",
            "Infinite Descent",
            "10 stack overflows. The bottom was a suggestion.",
            "\u{1f31f}",
            Gold,
            10,
            "StackOverflowError",
        );

        // IllegalStateException
        add(
            "state_1",
            "Out of Order",
            "Your first illegal state.",
            "\u{1f504}",
            Bronze,
            1,
            "IllegalStateException",
        );
        add(
            "state_10",
            "State of Denial",
            "10 illegal states. Your objects live in interesting times.",
            "\u{1f3ae}",
            Silver,
            10,
            "IllegalStateException",
        );

        // TOTAL milestones
        add(
            "total_100",
            "Century of Chaos",
            "100 exceptions across all types.",
            "\u{1f396}\u{fe0f}",
            Platinum,
            100,
            TOTAL_KEY,
        );
        add(
            "total_500",
            "Exception Connoisseur",
            "500 exceptions. You collect failures like vintages.",
            "\u{1f3c5}",
            Diamond,
            500,
            TOTAL_KEY,
        );
        add(
            "total_1000",
            "Grand Archive of Failure",
            "1000 exceptions. Historians will study this run.",
            "\u{1f451}",
            Rainbow,
            1000,
            TOTAL_KEY,
        );

        Self::new(defs).expect("builtin catalog is valid")
    }

    /// Iterates the definitions.
    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    /// Returns true if the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    pub(crate) fn into_achievements(self) -> Vec<Achievement> {
        self.achievements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_order_matches_rarity() {
        assert!(AchievementTier::Bronze < AchievementTier::Silver);
        assert!(AchievementTier::Diamond < AchievementTier::Rainbow);
        assert_eq!(AchievementTier::Gold.rarity(), "Rare");
        assert_eq!(AchievementTier::Rainbow.rarity(), "Mythic");
    }

    #[test]
    fn unlock_timestamp_is_written_once() {
        let mut a = Achievement::new(
            "x_1",
            "X",
            "first x",
            "*",
            AchievementTier::Bronze,
            1,
            "XException",
        );
        assert!(!a.is_unlocked());

        let first = Utc::now();
        a.unlock(first);
        assert!(a.is_unlocked());
        assert_eq!(a.unlocked_at(), Some(first));

        a.unlock(first + chrono::Duration::seconds(10));
        assert_eq!(a.unlocked_at(), Some(first));
    }

    #[test]
    fn equality_is_by_id() {
        let a = Achievement::new("same", "A", "d", "*", AchievementTier::Bronze, 1, "X");
        let b = Achievement::new("same", "B", "other", "*", AchievementTier::Gold, 50, "Y");
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let defs = vec![
            Achievement::new("dup", "A", "d", "*", AchievementTier::Bronze, 1, "X"),
            Achievement::new("dup", "B", "d", "*", AchievementTier::Silver, 10, "X"),
        ];
        let err = AchievementCatalog::new(defs).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAchievementId { .. }));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let defs = vec![Achievement::new(
            "zero",
            "Z",
            "d",
            "*",
            AchievementTier::Bronze,
            0,
            "X",
        )];
        let err = AchievementCatalog::new(defs).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroThreshold { .. }));
    }

    #[test]
    fn builtin_catalog_shape() {
        let catalog = AchievementCatalog::builtin();
        assert!(!catalog.is_empty());

        // Every tracked ladder ascends and TOTAL carries the top tiers.
        let npe: Vec<u64> = catalog
            .iter()
            .filter(|a| a.counter_key == "NullPointerException")
            .map(|a| a.required_count)
            .collect();
        let mut sorted = npe.clone();
        sorted.sort_unstable();
        assert_eq!(npe, sorted);
        assert_eq!(npe, vec![1, 10, 50, 100]);

        let totals: Vec<u64> = catalog
            .iter()
            .filter(|a| a.counter_key == TOTAL_KEY)
            .map(|a| a.required_count)
            .collect();
        assert_eq!(totals, vec![100, 500, 1000]);
    }
}
