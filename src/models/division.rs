//! Division: a group of participants and their matches within one phase.

use crate::models::game::{Match, MatchId, Pair, Participant};
use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a division.
pub type DivisionId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionStatus {
    #[default]
    Active,
    Finished,
}

/// Which part of a multi-stage tournament a division belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    GroupStage,
    Playoff,
    MainBracket,
    Consolation,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    /// Sequence number; 1 is the top division.
    pub number: u32,
    /// Players the schedule was generated from.
    pub players: Vec<PlayerId>,
    /// Fixed pairs, for pair formats only (empty otherwise).
    #[serde(default)]
    pub pairs: Vec<Pair>,
    pub matches: Vec<Match>,
    pub status: DivisionStatus,
    pub phase: Option<PhaseTag>,
}

impl Division {
    /// Division of individual players.
    pub fn new(number: u32, players: Vec<PlayerId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            players,
            pairs: Vec::new(),
            matches: Vec::new(),
            status: DivisionStatus::Active,
            phase: None,
        }
    }

    /// Division of fixed pairs; `players` is derived from the pairs.
    pub fn with_pairs(number: u32, pairs: Vec<Pair>) -> Self {
        let players = pairs.iter().flat_map(|p| p.players()).collect();
        Self {
            pairs,
            ..Self::new(number, players)
        }
    }

    pub fn with_phase(mut self, phase: PhaseTag) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Ranked units of this division: its pairs when it has any, otherwise its players.
    pub fn participants(&self) -> Vec<Participant> {
        if self.pairs.is_empty() {
            self.players.iter().copied().map(Participant::Player).collect()
        } else {
            self.pairs.iter().copied().map(Participant::Pair).collect()
        }
    }

    /// Highest round number generated so far (0 when there are no matches).
    pub fn current_round(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    pub fn matches_in_round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn finished_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.is_finished())
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn finish(&mut self) {
        self.status = DivisionStatus::Finished;
    }
}
