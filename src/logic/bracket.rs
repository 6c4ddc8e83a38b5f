//! Single-elimination draws with optional consolation draw for first-round losers.

use super::generator::ensure_unique;
use crate::models::{EngineError, Participant, PhaseTag, Seeding, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Content of one side of a bracket match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "participant")]
pub enum Slot {
    Entrant(Participant),
    /// Free pass: the opponent advances without playing.
    Bye,
    /// Waiting for the winner (or loser) of an earlier match.
    Empty,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// 1-based round.
    pub round: usize,
    /// 0-based position within the round.
    pub position: usize,
    pub slot1: Slot,
    pub slot2: Slot,
    pub winner: Option<Side>,
}

impl BracketMatch {
    fn slot(&self, side: Side) -> Slot {
        match side {
            Side::One => self.slot1,
            Side::Two => self.slot2,
        }
    }

    fn is_playable(&self) -> bool {
        self.winner.is_none()
            && matches!(self.slot1, Slot::Entrant(_))
            && matches!(self.slot2, Slot::Entrant(_))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRound {
    pub number: usize,
    pub name: String,
    pub matches: Vec<BracketMatch>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Number of first-round slots (a power of two).
    pub size: usize,
    pub phase: PhaseTag,
    pub rounds: Vec<BracketRound>,
}

/// Which draw of a [`Brackets`] set a result belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Draw {
    Main,
    Consolation,
}

/// Main draw plus its optional consolation draw.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Brackets {
    pub main: Bracket,
    pub consolation: Option<Bracket>,
}

/// Smallest power of two covering `entrants` (at least 2).
pub fn bracket_size(entrants: usize) -> usize {
    entrants.next_power_of_two().max(2)
}

/// Seed numbers (1-based) in slot order, so that seed 1 and 2 can only meet in the final:
/// 4 → [1, 4, 2, 3], 8 → [1, 8, 4, 5, 2, 7, 3, 6].
pub fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let n = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}

/// Round name from how many rounds are left including this one.
pub fn round_name(rounds_remaining: usize) -> String {
    match rounds_remaining {
        1 => "Final".to_string(),
        2 => "Semifinal".to_string(),
        3 => "Quarterfinal".to_string(),
        n => format!("Round of {}", 1usize << n),
    }
}

impl Bracket {
    /// Build a draw from first-round slots (length must be a power of two) and settle byes.
    fn from_slots(slots: Vec<Slot>, phase: PhaseTag) -> Self {
        let size = slots.len();
        let total_rounds = size.trailing_zeros() as usize;
        let rounds = (1..=total_rounds)
            .map(|number| {
                let count = size >> number;
                let matches = (0..count)
                    .map(|position| {
                        let (slot1, slot2) = if number == 1 {
                            (slots[position * 2], slots[position * 2 + 1])
                        } else {
                            (Slot::Empty, Slot::Empty)
                        };
                        BracketMatch {
                            round: number,
                            position,
                            slot1,
                            slot2,
                            winner: None,
                        }
                    })
                    .collect();
                BracketRound {
                    number,
                    name: round_name(total_rounds - number + 1),
                    matches,
                }
            })
            .collect();
        let mut bracket = Bracket { size, phase, rounds };
        for position in 0..size / 2 {
            bracket.settle(1, position);
        }
        bracket
    }

    fn get(&self, round: usize, position: usize) -> Option<&BracketMatch> {
        self.rounds.get(round.checked_sub(1)?)?.matches.get(position)
    }

    fn get_mut(&mut self, round: usize, position: usize) -> Option<&mut BracketMatch> {
        self.rounds.get_mut(round.checked_sub(1)?)?.matches.get_mut(position)
    }

    /// Put `slot` into the match fed by (round, position) and settle it.
    fn advance(&mut self, round: usize, position: usize, slot: Slot) {
        let next_round = round + 1;
        let next_position = position / 2;
        let Some(next) = self.get_mut(next_round, next_position) else {
            return;
        };
        if position % 2 == 0 {
            next.slot1 = slot;
        } else {
            next.slot2 = slot;
        }
        self.settle(next_round, next_position);
    }

    /// Resolve a match whose outcome needs no play: an entrant facing a bye advances,
    /// two byes send a bye forward.
    fn settle(&mut self, round: usize, position: usize) {
        let Some(m) = self.get_mut(round, position) else {
            return;
        };
        if m.winner.is_some() {
            return;
        }
        let forward = match (m.slot1, m.slot2) {
            (Slot::Entrant(_), Slot::Bye) => {
                m.winner = Some(Side::One);
                m.slot1
            }
            (Slot::Bye, Slot::Entrant(_)) => {
                m.winner = Some(Side::Two);
                m.slot2
            }
            (Slot::Bye, Slot::Bye) => Slot::Bye,
            _ => return,
        };
        self.advance(round, position, forward);
    }

    /// Record a played result and move the winner on. Returns the loser.
    fn record(&mut self, round: usize, position: usize, side: Side) -> Result<Participant, EngineError> {
        let m = self
            .get_mut(round, position)
            .filter(|m| m.is_playable())
            .ok_or(EngineError::InvalidBracketSlot { round, position })?;
        m.winner = Some(side);
        let (winner, loser) = (m.slot(side), m.slot(side.opposite()));
        self.advance(round, position, winner);
        match loser {
            Slot::Entrant(p) => Ok(p),
            _ => Err(EngineError::InvalidBracketSlot { round, position }),
        }
    }

    /// Winner of the final, once played.
    pub fn champion(&self) -> Option<Participant> {
        let last = self.rounds.last()?.matches.first()?;
        match last.slot(last.winner?) {
            Slot::Entrant(p) => Some(p),
            _ => None,
        }
    }

    /// Positions of first-round matches that are actually played (no bye).
    fn played_first_round(&self) -> Vec<usize> {
        self.rounds
            .first()
            .map(|r| {
                r.matches
                    .iter()
                    .filter(|m| matches!((m.slot1, m.slot2), (Slot::Entrant(_), Slot::Entrant(_))))
                    .map(|m| m.position)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Build a main draw (and optionally an empty consolation draw) from entrants.
///
/// With `Seeding::Seeded` the entrant order is the seed order; with `Seeding::Random` the
/// entrants are shuffled first. Byes always go to the top seeds.
pub fn generate_bracket<R: Rng + ?Sized>(
    entrants: &[Participant],
    seeding: Seeding,
    consolation: bool,
    rng: &mut R,
) -> Result<Brackets, EngineError> {
    if entrants.len() < 2 {
        return Err(EngineError::NotEnoughParticipants {
            required: 2,
            found: entrants.len(),
        });
    }
    ensure_unique(entrants.iter().flat_map(|p| p.players()))?;

    let mut seeds = entrants.to_vec();
    if seeding == Seeding::Random {
        seeds.shuffle(rng);
    }
    let size = bracket_size(seeds.len());
    let slots = seed_order(size)
        .into_iter()
        .map(|seed| seeds.get(seed - 1).map_or(Slot::Bye, |p| Slot::Entrant(*p)))
        .collect();
    let main = Bracket::from_slots(slots, PhaseTag::MainBracket);

    let consolation = if consolation {
        let feeders = main.played_first_round().len();
        (feeders >= 2).then(|| {
            let size = bracket_size(feeders);
            let slots = seed_order(size)
                .into_iter()
                .map(|seed| if seed > feeders { Slot::Bye } else { Slot::Empty })
                .collect();
            Bracket::from_slots(slots, PhaseTag::Consolation)
        })
    } else {
        None
    };
    log::debug!(
        "Bracket of size {} for {} entrants ({} bye(s), consolation: {})",
        size,
        entrants.len(),
        size - entrants.len(),
        consolation.is_some()
    );
    Ok(Brackets { main, consolation })
}

impl Brackets {
    /// Record the winner of a match. A loser of a played first-round main match drops
    /// into the consolation draw, in first-round order.
    pub fn record_winner(&mut self, draw: Draw, round: usize, position: usize, side: Side) -> Result<(), EngineError> {
        match draw {
            Draw::Main => {
                let feeders = self.main.played_first_round();
                let loser = self.main.record(round, position, side)?;
                if round != 1 {
                    return Ok(());
                }
                let Some(cons) = self.consolation.as_mut() else {
                    return Ok(());
                };
                let Some(k) = feeders.iter().position(|&p| p == position) else {
                    return Ok(());
                };
                let Some(slot_idx) = seed_order(cons.size).iter().position(|&s| s == k + 1) else {
                    return Ok(());
                };
                if let Some(m) = cons.get_mut(1, slot_idx / 2) {
                    if slot_idx % 2 == 0 {
                        m.slot1 = Slot::Entrant(loser);
                    } else {
                        m.slot2 = Slot::Entrant(loser);
                    }
                }
                cons.settle(1, slot_idx / 2);
                Ok(())
            }
            Draw::Consolation => {
                let cons = self
                    .consolation
                    .as_mut()
                    .ok_or(EngineError::InvalidBracketSlot { round, position })?;
                cons.record(round, position, side).map(|_| ())
            }
        }
    }

    pub fn get(&self, draw: Draw, round: usize, position: usize) -> Option<&BracketMatch> {
        match draw {
            Draw::Main => self.main.get(round, position),
            Draw::Consolation => self.consolation.as_ref()?.get(round, position),
        }
    }
}
