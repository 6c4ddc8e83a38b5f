//! Pozo (king of the court) ladder: winners climb toward court 1, losers drop away from it.
//!
//! Round flow: `Pending` (matches generated, results missing) → `Complete` (every match of
//! the round finished) → `Pending` again once the caller asks for the next round. When the
//! ladder ends is up to the caller.

use crate::models::{Division, EngineError, Match, Pair, PozoVariant, Side};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "round")]
pub enum RoundState {
    /// No round generated yet.
    NotStarted,
    Pending(u32),
    Complete(u32),
}

/// Where the current round of a ladder division stands.
pub fn round_state(division: &Division) -> RoundState {
    let round = division.current_round();
    if round == 0 {
        return RoundState::NotStarted;
    }
    if division.matches_in_round(round).all(|m| m.is_finished()) {
        RoundState::Complete(round)
    } else {
        RoundState::Pending(round)
    }
}

/// First round: shuffle and seat 4 players (or 2 pairs) per court, court 1 first.
/// Courts that cannot be filled completely are left out.
pub fn initial_round<R: Rng + ?Sized>(
    division: &Division,
    courts: u32,
    variant: PozoVariant,
    rng: &mut R,
) -> Result<Vec<Match>, EngineError> {
    if courts == 0 {
        return Err(EngineError::MissingConfig("courts"));
    }
    let courts = courts as usize;
    let pairs: Vec<Pair> = match variant {
        PozoVariant::Individual => {
            super::generator::ensure_unique(division.players.iter().copied())?;
            if division.players.len() < 4 {
                return Err(EngineError::NotEnoughParticipants {
                    required: 4,
                    found: division.players.len(),
                });
            }
            let mut players = division.players.clone();
            players.shuffle(rng);
            players
                .chunks_exact(2)
                .take(courts * 2)
                .map(|c| Pair::new(c[0], c[1]))
                .collect::<Result<_, _>>()?
        }
        PozoVariant::FixedPairs => {
            super::generator::validate_pairs(&division.pairs, 2)?;
            let mut pairs = division.pairs.clone();
            pairs.shuffle(rng);
            pairs.truncate(courts * 2);
            pairs
        }
    };

    let matches: Vec<Match> = (1..)
        .zip(pairs.chunks_exact(2))
        .map(|(court, c)| Match::new(division.id, 1, c[0], c[1], Some(court)))
        .collect();
    if matches.len() < courts {
        log::warn!(
            "Pozo division {}: only {} of {} courts could be filled",
            division.number,
            matches.len(),
            courts
        );
    }
    Ok(matches)
}

/// Winner of a finished ladder match. Ties cannot happen under ladder scoring; if one
/// slips through, pair 1 is taken as the winner so the ladder can keep moving.
fn ladder_winner(m: &Match) -> Side {
    if let Some(side) = m.winner {
        return side;
    }
    match m.points_awarded {
        Some((p1, p2)) if p2 > p1 => Side::Two,
        _ => {
            log::warn!("Ladder match {} ended level; pair 1 advances", m.id);
            Side::One
        }
    }
}

/// Compute the next round from the finished matches of the current round.
///
/// Matches are processed in court order, winners before losers, which fixes the arrival
/// order inside each destination court. Individual variant: arrivals `[a, b]` and `[c, d]`
/// become `(a, c) v (b, d)` so partners are always split. Fixed pairs: first arrival vs
/// second arrival.
pub fn calculate_next_round(matches: &[Match], variant: PozoVariant) -> Result<Vec<Match>, EngineError> {
    let round = matches.iter().map(|m| m.round).max().ok_or(EngineError::InvalidState)?;
    let mut current: Vec<&Match> = matches.iter().filter(|m| m.round == round).collect();
    if current.iter().any(|m| !m.is_finished()) {
        return Err(EngineError::RoundIncomplete { round });
    }
    current.sort_by_key(|m| m.court.unwrap_or(u32::MAX));

    let last = current.len() - 1;
    let mut buckets: Vec<Vec<Pair>> = vec![Vec::with_capacity(2); current.len()];
    for (i, m) in current.iter().enumerate() {
        let winner = ladder_winner(m);
        let up = i.saturating_sub(1);
        let down = (i + 1).min(last);
        buckets[up].push(*m.pair(winner));
        buckets[down].push(*m.pair(winner.opposite()));
    }

    let division_id = current[0].division_id;
    let next = round + 1;
    let mut out = Vec::with_capacity(buckets.len());
    for (court, bucket) in (1..).zip(buckets) {
        let [first, second] = *bucket.as_slice() else {
            return Err(EngineError::InvalidState);
        };
        let (pair1, pair2) = match variant {
            PozoVariant::FixedPairs => (first, second),
            PozoVariant::Individual => (
                Pair::new(first.p1, second.p1)?,
                Pair::new(first.p2, second.p2)?,
            ),
        };
        out.push(Match::new(division_id, next, pair1, pair2, Some(court)));
    }
    Ok(out)
}

/// Append the next ladder round to the division. The current round must be complete.
pub fn advance_pozo(division: &mut Division, variant: PozoVariant) -> Result<u32, EngineError> {
    match round_state(division) {
        RoundState::Complete(_) => {}
        RoundState::Pending(round) => return Err(EngineError::RoundIncomplete { round }),
        RoundState::NotStarted => return Err(EngineError::InvalidState),
    }
    let next = calculate_next_round(&division.matches, variant)?;
    let round = next.first().map(|m| m.round).unwrap_or_default();
    log::info!(
        "Pozo division {} advanced to round {} ({} courts)",
        division.number,
        round,
        next.len()
    );
    division.matches.extend(next);
    Ok(round)
}
