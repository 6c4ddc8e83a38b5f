//! Match, Pair, Side and Score for 2v2 padel matches.

use crate::models::player::PlayerId;
use crate::models::ranking::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which pair of a match (pair 1 or pair 2).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Two players playing on the same side. Never self-referential.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub p1: PlayerId,
    pub p2: PlayerId,
}

impl Pair {
    pub fn new(p1: PlayerId, p2: PlayerId) -> Result<Self, EngineError> {
        if p1 == p2 {
            return Err(EngineError::InvalidPair(p1));
        }
        Ok(Self { p1, p2 })
    }

    /// Build a pair from a raw tuple; anything other than exactly two ids is rejected.
    pub fn from_slice(ids: &[PlayerId]) -> Result<Self, EngineError> {
        match ids {
            [p1, p2] => Self::new(*p1, *p2),
            _ => Err(EngineError::WrongParticipantCount {
                expected: 2,
                found: ids.len(),
            }),
        }
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.p1, self.p2]
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.p1 == player || self.p2 == player
    }

    /// Same two players regardless of slot order.
    pub fn same_players(&self, other: &Pair) -> bool {
        (self.p1 == other.p1 && self.p2 == other.p2) || (self.p1 == other.p2 && self.p2 == other.p1)
    }
}

/// The unit that is ranked, moved between divisions and seeded in brackets:
/// a single player in individual formats, a fixed pair in pair formats.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Participant {
    Player(PlayerId),
    Pair(Pair),
}

impl Participant {
    pub fn players(&self) -> Vec<PlayerId> {
        match self {
            Participant::Player(id) => vec![*id],
            Participant::Pair(pair) => pair.players().to_vec(),
        }
    }

    pub fn is_same(&self, other: &Participant) -> bool {
        match (self, other) {
            (Participant::Player(a), Participant::Player(b)) => a == b,
            (Participant::Pair(a), Participant::Pair(b)) => a.same_players(b),
            _ => false,
        }
    }
}

/// Participant pool handed to the engine when a ranking starts.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "entries")]
pub enum Entrants {
    Players(Vec<PlayerId>),
    Pairs(Vec<Pair>),
}

impl Entrants {
    pub fn len(&self) -> usize {
        match self {
            Entrants::Players(p) => p.len(),
            Entrants::Pairs(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pairs(&self) -> bool {
        matches!(self, Entrants::Pairs(_))
    }

    pub fn participants(&self) -> Vec<Participant> {
        match self {
            Entrants::Players(p) => p.iter().copied().map(Participant::Player).collect(),
            Entrants::Pairs(p) => p.iter().copied().map(Participant::Pair).collect(),
        }
    }
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Finished,
    NotPlayed,
}

/// Games won by each pair in one set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub pair1: u32,
    pub pair2: u32,
}

/// Raw score payload as entered by the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Score {
    /// Traditional sets, e.g. 6-4 3-6 7-5.
    Sets { sets: Vec<SetScore> },
    /// Accumulated points of a fixed-total-points match (Americano, Mexicano).
    Points { pair1: u32, pair2: u32 },
}

impl Score {
    pub fn sets(sets: &[(u32, u32)]) -> Self {
        Score::Sets {
            sets: sets
                .iter()
                .map(|&(pair1, pair2)| SetScore { pair1, pair2 })
                .collect(),
        }
    }

    pub fn points(pair1: u32, pair2: u32) -> Self {
        Score::Points { pair1, pair2 }
    }
}

/// A single 2v2 match inside a division.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub division_id: Uuid,
    /// Round number ("jornada"), starting at 1.
    pub round: u32,
    pub pair1: Pair,
    pub pair2: Pair,
    /// Court index (1-based) when the format assigns courts.
    pub court: Option<u32>,
    pub status: MatchStatus,
    /// None until a result is recorded.
    pub score: Option<Score>,
    /// Points each pair earns in the standings. Only present when finished.
    pub points_awarded: Option<(i32, i32)>,
    /// None for pending matches and draws.
    pub winner: Option<Side>,
    pub finished_at: Option<DateTime<Utc>>,
    /// How many times a finished result was explicitly corrected.
    #[serde(default)]
    pub corrections: u32,
}

impl Match {
    pub fn new(division_id: Uuid, round: u32, pair1: Pair, pair2: Pair, court: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            division_id,
            round,
            pair1,
            pair2,
            court,
            status: MatchStatus::Pending,
            score: None,
            points_awarded: None,
            winner: None,
            finished_at: None,
            corrections: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn pair(&self, side: Side) -> &Pair {
        match side {
            Side::One => &self.pair1,
            Side::Two => &self.pair2,
        }
    }

    /// All four players, pair 1 first.
    pub fn players(&self) -> [PlayerId; 4] {
        [self.pair1.p1, self.pair1.p2, self.pair2.p1, self.pair2.p2]
    }

    /// Which side a participant played on, if at all.
    pub fn side_of(&self, participant: &Participant) -> Option<Side> {
        match participant {
            Participant::Player(id) if self.pair1.contains(*id) => Some(Side::One),
            Participant::Player(id) if self.pair2.contains(*id) => Some(Side::Two),
            Participant::Pair(pair) if self.pair1.same_players(pair) => Some(Side::One),
            Participant::Pair(pair) if self.pair2.same_players(pair) => Some(Side::Two),
            _ => None,
        }
    }

    /// Store a resolved result. Fails on a match that is already finished; use
    /// [`Match::apply_correction`] for that.
    pub(crate) fn apply_result(
        &mut self,
        score: Score,
        points_awarded: (i32, i32),
        winner: Option<Side>,
    ) -> Result<(), EngineError> {
        if self.is_finished() {
            return Err(EngineError::MatchAlreadyFinished(self.id));
        }
        self.finish(score, points_awarded, winner);
        Ok(())
    }

    /// Replace the result of a finished match. Counted so corrections stay auditable.
    pub(crate) fn apply_correction(
        &mut self,
        score: Score,
        points_awarded: (i32, i32),
        winner: Option<Side>,
    ) -> Result<(), EngineError> {
        if !self.is_finished() {
            return Err(EngineError::MatchNotFinished(self.id));
        }
        self.finish(score, points_awarded, winner);
        self.corrections += 1;
        Ok(())
    }

    fn finish(&mut self, score: Score, points_awarded: (i32, i32), winner: Option<Side>) {
        self.status = MatchStatus::Finished;
        self.score = Some(score);
        self.points_awarded = Some(points_awarded);
        self.winner = winner;
        self.finished_at = Some(Utc::now());
    }

    /// Mark a pending match as not played (walkover without points, postponed for good...).
    pub fn mark_not_played(&mut self) -> Result<(), EngineError> {
        if self.is_finished() {
            return Err(EngineError::MatchAlreadyFinished(self.id));
        }
        self.status = MatchStatus::NotPlayed;
        Ok(())
    }
}
