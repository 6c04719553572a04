//! Score and boredom bookkeeping for a running level.

use lunk_core::{Edibility, ScoreSnapshot};

/// Gameplay occurrences that move the score or boredom counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreEvent {
    /// An enemy was crushed or thrown into a wall.
    EnemyCrushed,
    /// An enemy was eaten.
    EnemyEaten(Edibility),
    /// A friendly was caught by an enemy or hit by a thrown one.
    FriendlyLost,
    /// A friendly was rescued.
    FriendlyRescued,
    /// An item was collected.
    ItemCollected,
    /// The player cleared a wall.
    WallCleared,
}

/// Signed change applied to the score and boredom counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ScoreDelta {
    /// Change applied to the score.
    pub score: i32,
    /// Change applied to the boredom budget; positive values relieve boredom.
    pub boredom: i32,
}

impl ScoreDelta {
    /// Creates a new delta.
    #[must_use]
    pub const fn new(score: i32, boredom: i32) -> Self {
        Self { score, boredom }
    }
}

/// Lookup table translating score events into counter deltas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreTable {
    /// Delta applied when an enemy is crushed.
    pub enemy_crushed: ScoreDelta,
    /// Delta applied when a tasty enemy is eaten.
    pub enemy_eaten_tasty: ScoreDelta,
    /// Delta applied when a rotten enemy is eaten.
    pub enemy_eaten_rotten: ScoreDelta,
    /// Delta applied when a friendly is lost.
    pub friendly_lost: ScoreDelta,
    /// Delta applied when a friendly is rescued.
    pub friendly_rescued: ScoreDelta,
    /// Delta applied when an item is collected.
    pub item_collected: ScoreDelta,
    /// Percentage of the boredom maximum deducted when the player clears a wall.
    pub wall_penalty_percent: u32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            enemy_crushed: ScoreDelta::new(1, 5),
            enemy_eaten_tasty: ScoreDelta::new(1, 10),
            enemy_eaten_rotten: ScoreDelta::new(0, -10),
            friendly_lost: ScoreDelta::new(-6, -10),
            friendly_rescued: ScoreDelta::new(5, 10),
            item_collected: ScoreDelta::new(3, 15),
            wall_penalty_percent: 25,
        }
    }
}

impl ScoreTable {
    /// Delta for `event` in a level whose boredom budget is `boredom_max`.
    #[must_use]
    pub fn delta(&self, event: ScoreEvent, boredom_max: u32) -> ScoreDelta {
        match event {
            ScoreEvent::EnemyCrushed => self.enemy_crushed,
            ScoreEvent::EnemyEaten(Edibility::Tasty) => self.enemy_eaten_tasty,
            ScoreEvent::EnemyEaten(Edibility::Rotten) => self.enemy_eaten_rotten,
            ScoreEvent::FriendlyLost => self.friendly_lost,
            ScoreEvent::FriendlyRescued => self.friendly_rescued,
            ScoreEvent::ItemCollected => self.item_collected,
            ScoreEvent::WallCleared => {
                let penalty = u64::from(boredom_max) * u64::from(self.wall_penalty_percent) / 100;
                let penalty = i32::try_from(penalty).unwrap_or(i32::MAX);
                ScoreDelta::new(0, -penalty)
            }
        }
    }
}

/// Owned score and boredom counters.
///
/// The score never drops below zero and boredom always stays within
/// `0..=boredom_max`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
    boredom: u32,
    boredom_max: u32,
}

impl ScoreTracker {
    /// Creates a tracker with a zero score and a full boredom budget.
    #[must_use]
    pub const fn new(boredom_max: u32) -> Self {
        Self {
            score: 0,
            boredom: boredom_max,
            boredom_max,
        }
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Remaining boredom budget.
    #[must_use]
    pub const fn boredom(&self) -> u32 {
        self.boredom
    }

    /// Boredom budget the level started with.
    #[must_use]
    pub const fn boredom_max(&self) -> u32 {
        self.boredom_max
    }

    /// Reports whether the boredom budget ran out.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.boredom == 0
    }

    /// Captures the counters.
    #[must_use]
    pub const fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            boredom: self.boredom,
            boredom_max: self.boredom_max,
        }
    }

    /// Applies the delta `table` assigns to `event` and returns the new counters.
    pub fn record(&mut self, event: ScoreEvent, table: &ScoreTable) -> ScoreSnapshot {
        self.apply(table.delta(event, self.boredom_max))
    }

    /// Applies a raw delta with saturation and returns the new counters.
    pub fn apply(&mut self, delta: ScoreDelta) -> ScoreSnapshot {
        self.score = saturating_offset(self.score, delta.score, u32::MAX);
        self.boredom = saturating_offset(self.boredom, delta.boredom, self.boredom_max);
        self.snapshot()
    }

    /// Removes `amount` boredom through passive decay.
    pub fn decay(&mut self, amount: u32) -> ScoreSnapshot {
        self.boredom = self.boredom.saturating_sub(amount);
        self.snapshot()
    }
}

fn saturating_offset(value: u32, delta: i32, max: u32) -> u32 {
    let shifted = i64::from(value) + i64::from(delta);
    let clamped = shifted.clamp(0, i64::from(max));
    u32::try_from(clamped).unwrap_or(max)
}
