//! Derived standings rows. Recomputed on demand, never stored as a source of truth.

use crate::models::game::Participant;
use crate::models::player::StatAdjustment;
use serde::{Deserialize, Serialize};

/// Statistics computed from finished matches only.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub points: i32,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_drawn: i32,
    pub matches_lost: i32,
    pub sets_won: i32,
    pub sets_lost: i32,
    pub games_won: i32,
    pub games_lost: i32,
}

impl StatLine {
    /// Computed values with a manual adjustment laid on top.
    pub fn with_adjustment(&self, adj: &StatAdjustment) -> StatLine {
        StatLine {
            points: self.points + adj.points,
            matches_played: self.matches_played + adj.matches_played,
            matches_won: self.matches_won + adj.matches_won,
            matches_drawn: self.matches_drawn,
            matches_lost: self.matches_lost,
            sets_won: self.sets_won + adj.sets_won,
            sets_lost: self.sets_lost + adj.sets_lost,
            games_won: self.games_won + adj.games_won,
            games_lost: self.games_lost + adj.games_lost,
        }
    }

    pub fn set_difference(&self) -> i32 {
        self.sets_won - self.sets_lost
    }

    pub fn game_difference(&self) -> i32 {
        self.games_won - self.games_lost
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches_played <= 0 {
            0.0
        } else {
            self.matches_won as f64 / self.matches_played as f64
        }
    }
}

/// Position change compared to the previous snapshot. Informational only.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Same,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    /// 1-based rank.
    pub position: usize,
    pub participant: Participant,
    pub computed: StatLine,
    pub adjustment: StatAdjustment,
    pub trend: Trend,
}

impl StandingRow {
    /// Computed statistics plus the manual adjustment.
    pub fn totals(&self) -> StatLine {
        self.computed.with_adjustment(&self.adjustment)
    }

    pub fn points(&self) -> i32 {
        self.totals().points
    }
}
