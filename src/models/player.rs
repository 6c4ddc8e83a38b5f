//! Player, PlayerStats and manual statistic adjustments.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in pairs, matches and standings).
pub type PlayerId = Uuid;

/// Lifetime statistics of a player (for API / display).
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
}

impl PlayerStats {
    /// Share of played matches that were won. Zero when nothing has been played yet.
    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            0.0
        } else {
            self.matches_won as f64 / self.matches_played as f64
        }
    }
}

/// Additive corrections an administrator applies on top of computed statistics.
///
/// Never replaces a computed value: standings keep the computed line and the
/// adjustment side by side and only sum them when reading totals.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatAdjustment {
    pub points: i32,
    pub matches_played: i32,
    pub matches_won: i32,
    pub sets_won: i32,
    pub sets_lost: i32,
    pub games_won: i32,
    pub games_lost: i32,
}

impl StatAdjustment {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::ops::Add for StatAdjustment {
    type Output = StatAdjustment;

    fn add(self, rhs: StatAdjustment) -> StatAdjustment {
        StatAdjustment {
            points: self.points + rhs.points,
            matches_played: self.matches_played + rhs.matches_played,
            matches_won: self.matches_won + rhs.matches_won,
            sets_won: self.sets_won + rhs.sets_won,
            sets_lost: self.sets_lost + rhs.sets_lost,
            games_won: self.games_won + rhs.games_won,
            games_lost: self.games_lost + rhs.games_lost,
        }
    }
}

/// A player registered in a ranking. Created by the caller; the engine only reads it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub stats: PlayerStats,
    #[serde(default)]
    pub adjustment: StatAdjustment,
}

impl Player {
    /// Create a new player with the given name. Statistics start at zero.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            stats: PlayerStats::default(),
            adjustment: StatAdjustment::default(),
        }
    }

    /// Lifetime win rate; 0.0 for a player without matches.
    pub fn win_rate(&self) -> f64 {
        self.stats.win_rate()
    }
}
