//! Phase transition: movements from final standings, manual overrides on top of them, and
//! the divisions of the next phase.

use super::setup::generate_division_matches;
use super::standings::{compute_standings, player_lifetime_stats};
use crate::models::{
    Division, EngineError, MatchStatus, Movement, MovementKind, Pair, Participant, PlayerId, Ranking,
    RankingConfig, SizePolicy, SizeWarning, StandingRow,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Pending movements of every participant, open to manual overrides until confirmed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MovementPlan {
    pub movements: Vec<Movement>,
}

impl MovementPlan {
    fn find_mut(&mut self, participant: &Participant) -> Result<&mut Movement, EngineError> {
        self.movements
            .iter_mut()
            .find(|m| m.participant.is_same(participant))
            .ok_or(EngineError::ParticipantNotFound)
    }

    pub fn get(&self, participant: &Participant) -> Option<&Movement> {
        self.movements.iter().find(|m| m.participant.is_same(participant))
    }

    /// Send a participant to `destination` regardless of the computed movement.
    pub fn override_destination(&mut self, participant: &Participant, destination: u32) -> Result<(), EngineError> {
        if destination == 0 {
            return Err(EngineError::DivisionNotFound(0));
        }
        self.find_mut(participant)?.manual_override = Some(destination);
        Ok(())
    }

    /// Drop the override and fall back to the computed destination.
    pub fn clear_override(&mut self, participant: &Participant) -> Result<(), EngineError> {
        self.find_mut(participant)?.manual_override = None;
        Ok(())
    }

    pub fn overridden(&self) -> impl Iterator<Item = &Movement> {
        self.movements.iter().filter(|m| m.is_overridden())
    }

    /// Participant count per destination division.
    pub fn destination_sizes(&self) -> BTreeMap<u32, usize> {
        let mut sizes = BTreeMap::new();
        for m in &self.movements {
            *sizes.entry(m.effective_destination()).or_default() += 1;
        }
        sizes
    }

    /// Divisions 1..=highest destination whose resulting size is not `expected`.
    /// Formats without a fixed size never warn.
    pub fn validate(&self, expected: Option<usize>) -> Vec<SizeWarning> {
        let Some(expected) = expected else {
            return Vec::new();
        };
        let sizes = self.destination_sizes();
        let last = sizes.keys().next_back().copied().unwrap_or(0);
        (1..=last)
            .filter_map(|division| {
                let actual = sizes.get(&division).copied().unwrap_or(0);
                (actual != expected).then_some(SizeWarning {
                    division,
                    expected,
                    actual,
                })
            })
            .collect()
    }
}

/// Classify every row of every division's final standings.
///
/// The top `promotion` rows go up one division and the bottom `relegation` rows down one;
/// when both ranges overlap the row goes up. Destinations are clamped to
/// `1..=division_count`, so the top division keeps its promoted rows and the lowest keeps
/// its relegated ones.
pub fn compute_movements(
    standings: &[(u32, Vec<StandingRow>)],
    promotion: usize,
    relegation: usize,
    division_count: u32,
) -> MovementPlan {
    let last = division_count.max(1);
    let movements = standings
        .iter()
        .flat_map(|(origin, rows)| {
            let origin = *origin;
            let n = rows.len();
            rows.iter().enumerate().map(move |(i, row)| {
                let kind = if i < promotion {
                    MovementKind::Up
                } else if i + relegation >= n {
                    MovementKind::Down
                } else {
                    MovementKind::Stay
                };
                let destination = match kind {
                    MovementKind::Up => origin.saturating_sub(1).max(1),
                    MovementKind::Down => (origin + 1).min(last),
                    MovementKind::Stay => origin,
                };
                Movement {
                    participant: row.participant,
                    origin,
                    origin_position: row.position,
                    kind,
                    destination,
                    manual_override: None,
                }
            })
        })
        .collect();
    MovementPlan { movements }
}

/// Divisions of the next phase plus the size warnings raised while building them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub divisions: Vec<Division>,
    pub warnings: Vec<SizeWarning>,
}

/// Build the next phase's divisions from a (possibly overridden) plan.
///
/// Every participant of `previous` must appear in the plan exactly once. Members are
/// ordered by origin division, then by final position there. Divisions with a size
/// warning are created without matches so the caller can fix them up; with
/// `SizePolicy::Reject` any warning aborts instead.
pub fn confirm_movements<R: Rng + ?Sized>(
    plan: &MovementPlan,
    previous: &[Division],
    config: &RankingConfig,
    rng: &mut R,
) -> Result<PhaseOutcome, EngineError> {
    let expected: HashSet<Participant> = previous.iter().flat_map(|d| d.participants()).collect();
    let planned: HashSet<Participant> = plan.movements.iter().map(|m| m.participant).collect();
    if expected != planned || planned.len() != plan.movements.len() {
        return Err(EngineError::ParticipantNotFound);
    }

    let warnings = plan.validate(config.format.expected_division_size());
    if !warnings.is_empty() && config.size_policy == SizePolicy::Reject {
        return Err(EngineError::DivisionSizeMismatch(warnings));
    }
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let mut ordered: Vec<&Movement> = plan.movements.iter().collect();
    ordered.sort_by_key(|m| (m.effective_destination(), m.origin, m.origin_position));
    let mut members: BTreeMap<u32, Vec<Participant>> = BTreeMap::new();
    for m in ordered {
        members.entry(m.effective_destination()).or_default().push(m.participant);
    }

    let mut divisions = Vec::with_capacity(members.len());
    for (number, participants) in members {
        let mut division = if config.format.uses_pairs() {
            let pairs = participants
                .iter()
                .map(|p| match p {
                    Participant::Pair(pair) => Ok(*pair),
                    Participant::Player(_) => Err(EngineError::EntrantKindMismatch { pairs_expected: true }),
                })
                .collect::<Result<Vec<Pair>, EngineError>>()?;
            Division::with_pairs(number, pairs)
        } else {
            let players = participants
                .iter()
                .map(|p| match p {
                    Participant::Player(id) => Ok(*id),
                    Participant::Pair(_) => Err(EngineError::EntrantKindMismatch { pairs_expected: false }),
                })
                .collect::<Result<Vec<PlayerId>, EngineError>>()?;
            Division::new(number, players)
        };
        if !warnings.iter().any(|w| w.division == number) {
            generate_division_matches(&mut division, &config.format, rng)?;
        }
        divisions.push(division);
    }
    Ok(PhaseOutcome { divisions, warnings })
}

/// Movement plan for the current phase of a ranking, from its live standings.
pub fn preview_phase(ranking: &Ranking) -> Result<MovementPlan, EngineError> {
    if ranking.phase == 0 || ranking.divisions.is_empty() {
        return Err(EngineError::InvalidState);
    }
    let mut tables = Vec::with_capacity(ranking.divisions.len());
    for division in &ranking.divisions {
        let adjustments = ranking.adjustments(&division.participants());
        tables.push((
            division.number,
            compute_standings(division, &ranking.config, &adjustments, None)?,
        ));
    }
    let division_count = ranking.divisions.iter().map(|d| d.number).max().unwrap_or(1);
    Ok(compute_movements(
        &tables,
        ranking.config.promotion_count,
        ranking.config.relegation_count,
        division_count,
    ))
}

/// Close the current phase: build the next divisions from `plan`, archive the closed ones
/// and refresh players' lifetime statistics. Every match must have a result (or be marked
/// not played) first.
pub fn close_phase<R: Rng + ?Sized>(
    ranking: &mut Ranking,
    plan: &MovementPlan,
    rng: &mut R,
) -> Result<Vec<SizeWarning>, EngineError> {
    if ranking.phase == 0 {
        return Err(EngineError::InvalidState);
    }
    if let Some(m) = ranking
        .divisions
        .iter()
        .flat_map(|d| d.matches.iter())
        .find(|m| m.status == MatchStatus::Pending)
    {
        return Err(EngineError::RoundIncomplete { round: m.round });
    }

    let outcome = confirm_movements(plan, &ranking.divisions, &ranking.config, rng)?;
    let mut closed = std::mem::replace(&mut ranking.divisions, outcome.divisions);
    for division in &mut closed {
        division.finish();
    }
    ranking.history.extend(closed);
    ranking.phase += 1;

    let history = &ranking.history;
    for player in ranking.players.iter_mut() {
        player.stats = player_lifetime_stats(player.id, history);
    }
    ranking.touch();
    log::info!(
        "Ranking {} closed phase {}: {} movement(s), {} override(s), {} warning(s)",
        ranking.id,
        ranking.phase - 1,
        plan.movements.len(),
        plan.overridden().count(),
        outcome.warnings.len()
    );
    Ok(outcome.warnings)
}
