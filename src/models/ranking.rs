//! Ranking (the tournament) and EngineError.

use crate::models::config::{FormatKind, RankingConfig, TieBreakCriterion};
use crate::models::division::Division;
use crate::models::game::{MatchId, Participant};
use crate::models::movement::SizeWarning;
use crate::models::player::{Player, PlayerId, StatAdjustment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Errors that can occur during engine operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EngineError {
    /// The format needs an exact number of participants.
    WrongParticipantCount { expected: usize, found: usize },
    /// Not enough participants to generate anything.
    NotEnoughParticipants { required: usize, found: usize },
    /// The same player appears twice in the input.
    DuplicateParticipant(PlayerId),
    /// A pair would contain the same player twice.
    InvalidPair(PlayerId),
    /// A required configuration value is absent (e.g. number of courts).
    MissingConfig(&'static str),
    /// A format-specific operation was called with another format's configuration.
    FormatMismatch { expected: FormatKind, found: FormatKind },
    /// The operation has no meaning for this format (e.g. round advance in a league).
    UnsupportedFormat(FormatKind),
    /// Individual players given to a pair format, or the other way round.
    EntrantKindMismatch { pairs_expected: bool },
    /// The tie-break list would become empty.
    NoTieBreakCriteria,
    DuplicateTieBreak(TieBreakCriterion),
    UnknownTieBreak(TieBreakCriterion),
    /// Score payload does not fit the scoring mode.
    InvalidScore(String),
    MatchNotFound(MatchId),
    /// Result already recorded; only an explicit correction may change it.
    MatchAlreadyFinished(MatchId),
    /// Correction requested for a match without a result.
    MatchNotFinished(MatchId),
    /// Not every match of the round has a result.
    RoundIncomplete { round: u32 },
    DivisionNotFound(u32),
    ParticipantNotFound,
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    /// The ranking is not in a state that allows this action.
    InvalidState,
    /// Destination divisions have the wrong size and the ranking rejects that.
    DivisionSizeMismatch(Vec<SizeWarning>),
    /// Bracket slot cannot take a result (bye, empty slot or unknown position).
    InvalidBracketSlot { round: usize, position: usize },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::WrongParticipantCount { expected, found } => {
                write!(f, "Format needs exactly {} participants (got {})", expected, found)
            }
            EngineError::NotEnoughParticipants { required, found } => {
                write!(f, "Need at least {} participants (got {})", required, found)
            }
            EngineError::DuplicateParticipant(_) => write!(f, "A participant appears more than once"),
            EngineError::InvalidPair(_) => write!(f, "A pair cannot contain the same player twice"),
            EngineError::MissingConfig(what) => write!(f, "Missing configuration: {}", what),
            EngineError::FormatMismatch { expected, found } => {
                write!(f, "Operation needs {} configuration, ranking is {}", expected, found)
            }
            EngineError::UnsupportedFormat(kind) => {
                write!(f, "Operation is not available for the {} format", kind)
            }
            EngineError::EntrantKindMismatch { pairs_expected: true } => {
                write!(f, "This format is played by fixed pairs")
            }
            EngineError::EntrantKindMismatch { pairs_expected: false } => {
                write!(f, "This format is played by individual players")
            }
            EngineError::NoTieBreakCriteria => write!(f, "At least one tie-break criterion is required"),
            EngineError::DuplicateTieBreak(c) => write!(f, "Tie-break {:?} is already configured", c),
            EngineError::UnknownTieBreak(c) => write!(f, "Tie-break {:?} is not configured", c),
            EngineError::InvalidScore(reason) => write!(f, "Invalid score: {}", reason),
            EngineError::MatchNotFound(_) => write!(f, "Match not found"),
            EngineError::MatchAlreadyFinished(_) => {
                write!(f, "Match already has a result; use a correction to change it")
            }
            EngineError::MatchNotFinished(_) => write!(f, "Match has no result to correct"),
            EngineError::RoundIncomplete { round } => {
                write!(f, "Not all matches of round {} are finished", round)
            }
            EngineError::DivisionNotFound(n) => write!(f, "Division {} not found", n),
            EngineError::ParticipantNotFound => write!(f, "Participant not found"),
            EngineError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            EngineError::InvalidState => write!(f, "Invalid state for this action"),
            EngineError::DivisionSizeMismatch(warnings) => {
                let names: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
                write!(f, "Division sizes do not match the format: {}", names.join("; "))
            }
            EngineError::InvalidBracketSlot { round, position } => {
                write!(f, "No playable bracket match at round {} position {}", round, position)
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Unique identifier for a ranking.
pub type RankingId = Uuid;

/// A tournament: its players, configuration and current phase's divisions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ranking {
    pub id: RankingId,
    pub name: String,
    pub config: RankingConfig,
    pub players: Vec<Player>,
    /// Divisions of the current phase, ordered by number.
    pub divisions: Vec<Division>,
    /// Phase counter; 0 until the first divisions are created.
    pub phase: u32,
    /// Divisions of closed phases, oldest first.
    #[serde(default)]
    pub history: Vec<Division>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ranking {
    pub fn new(name: impl Into<String>, config: RankingConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
            players: Vec::new(),
            divisions: Vec::new(),
            phase: 0,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a player. Names must be unique (case-insensitive). Returns the new id.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId, EngineError> {
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(EngineError::InvalidState);
        }
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(EngineError::DuplicatePlayerName);
        }
        let player = Player::new(name_trimmed);
        let id = player.id;
        self.players.push(player);
        self.touch();
        Ok(id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Replace a player's manual adjustment.
    pub fn set_adjustment(&mut self, id: PlayerId, adjustment: StatAdjustment) -> Result<(), EngineError> {
        self.get_player_mut(id)
            .ok_or(EngineError::ParticipantNotFound)?
            .adjustment = adjustment;
        self.touch();
        Ok(())
    }

    /// Adjustments per ranked participant. A pair carries the sum of its players' adjustments.
    pub fn adjustments(&self, participants: &[Participant]) -> HashMap<Participant, StatAdjustment> {
        let by_player: HashMap<PlayerId, StatAdjustment> = self
            .players
            .iter()
            .filter(|p| !p.adjustment.is_zero())
            .map(|p| (p.id, p.adjustment))
            .collect();
        participants
            .iter()
            .filter_map(|part| {
                let total = part
                    .players()
                    .iter()
                    .filter_map(|id| by_player.get(id).copied())
                    .fold(StatAdjustment::default(), |acc, adj| acc + adj);
                (!total.is_zero()).then_some((*part, total))
            })
            .collect()
    }

    /// Swap the configuration. Applies to later computations only; movements already
    /// executed are left untouched.
    pub fn update_config(&mut self, config: RankingConfig) {
        self.config = config;
        self.touch();
    }

    pub fn division(&self, number: u32) -> Result<&Division, EngineError> {
        self.divisions
            .iter()
            .find(|d| d.number == number)
            .ok_or(EngineError::DivisionNotFound(number))
    }

    pub fn division_mut(&mut self, number: u32) -> Result<&mut Division, EngineError> {
        self.divisions
            .iter_mut()
            .find(|d| d.number == number)
            .ok_or(EngineError::DivisionNotFound(number))
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
