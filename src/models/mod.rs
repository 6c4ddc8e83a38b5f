//! Data structures for the competition engine: players, pairs, matches, divisions, rankings.

pub mod config;
mod division;
mod game;
mod movement;
mod player;
mod ranking;
mod standing;

pub use config::{
    defaults, FormatConfig, FormatKind, PointTable, PozoVariant, RankingConfig, RankingConfigBuilder,
    ScoringMode, Seeding, SizePolicy, TieBreakCriterion, TieBreakOrder,
};
pub use division::{Division, DivisionId, DivisionStatus, PhaseTag};
pub use game::{Entrants, Match, MatchId, MatchStatus, Pair, Participant, Score, SetScore, Side};
pub use movement::{Movement, MovementKind, SizeWarning};
pub use player::{Player, PlayerId, PlayerStats, StatAdjustment};
pub use ranking::{EngineError, Ranking, RankingId};
pub use standing::{StandingRow, StatLine, Trend};
