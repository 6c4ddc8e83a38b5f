//! Standings: aggregate finished matches per participant, then order them through the
//! configured tie-break cascade.

use super::scoring::{resolve, Outcome};
use crate::models::{
    Division, EngineError, Participant, PlayerId, PlayerStats, RankingConfig, Side, StandingRow,
    StatAdjustment, StatLine, TieBreakCriterion, Trend,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ranked rows for a division.
///
/// Results are re-resolved with the ranking's current point table, so a config change
/// applies to every later computation. `adjustments` are laid over the computed lines and
/// kept separate in each row. `previous` (an earlier snapshot) only feeds the trend arrow.
pub fn compute_standings(
    division: &Division,
    config: &RankingConfig,
    adjustments: &HashMap<Participant, StatAdjustment>,
    previous: Option<&[StandingRow]>,
) -> Result<Vec<StandingRow>, EngineError> {
    let participants = division.participants();
    let mut lines = vec![StatLine::default(); participants.len()];

    for m in division.finished_matches() {
        let Some(score) = &m.score else { continue };
        let res = resolve(score, config.scoring, &config.points)?;
        for (idx, participant) in participants.iter().enumerate() {
            let Some(side) = m.side_of(participant) else { continue };
            let line = &mut lines[idx];
            let (sets, games, points) = match side {
                Side::One => (res.sets, res.games, res.points.0),
                Side::Two => (
                    (res.sets.1, res.sets.0),
                    (res.games.1, res.games.0),
                    res.points.1,
                ),
            };
            line.matches_played += 1;
            match (res.outcome, side) {
                (Outcome::Draw, _) => line.matches_drawn += 1,
                (Outcome::Win, Side::One) | (Outcome::Loss, Side::Two) => line.matches_won += 1,
                _ => line.matches_lost += 1,
            }
            line.sets_won += sets.0 as i32;
            line.sets_lost += sets.1 as i32;
            line.games_won += games.0 as i32;
            line.games_lost += games.1 as i32;
            line.points += points;
        }
    }

    let rows: Vec<StandingRow> = participants
        .iter()
        .zip(lines)
        .map(|(participant, computed)| StandingRow {
            position: 0,
            participant: *participant,
            computed,
            adjustment: adjustments.get(participant).copied().unwrap_or_default(),
            trend: Trend::Same,
        })
        .collect();

    let order = cascade(division, config.tie_breaks.criteria(), &rows);
    let mut ranked: Vec<StandingRow> = order.into_iter().map(|idx| rows[idx].clone()).collect();

    let before: HashMap<Participant, usize> = previous
        .unwrap_or_default()
        .iter()
        .map(|r| (r.participant, r.position))
        .collect();
    for (i, row) in ranked.iter_mut().enumerate() {
        row.position = i + 1;
        row.trend = match before.get(&row.participant) {
            Some(&old) if old > row.position => Trend::Up,
            Some(&old) if old < row.position => Trend::Down,
            _ => Trend::Same,
        };
    }
    Ok(ranked)
}

/// Seed for the coin-flip criterion. Derived from the division so that repeated calls on
/// the same results give the same order.
fn coin_seed(division: &Division) -> u64 {
    let raw = division.id.as_u128();
    (raw as u64) ^ ((raw >> 64) as u64)
}

/// Apply the criteria in order, splitting tied groups further at each step.
/// Returns row indices in ranked order; rows never separated keep their input order.
///
/// `Random` is a last resort wherever it sits in the list: it only runs once every other
/// configured criterion has been applied.
fn cascade(division: &Division, criteria: &[TieBreakCriterion], rows: &[StandingRow]) -> Vec<usize> {
    let totals: Vec<StatLine> = rows.iter().map(|r| r.totals()).collect();
    let mut groups: Vec<Vec<usize>> = vec![(0..rows.len()).collect()];

    for criterion in criteria.iter().filter(|c| **c != TieBreakCriterion::Random) {
        if groups.iter().all(|g| g.len() == 1) {
            break;
        }
        let mut next = Vec::with_capacity(groups.len());
        for group in groups {
            if group.len() == 1 {
                next.push(group);
                continue;
            }
            match criterion {
                TieBreakCriterion::DirectEncounter => {
                    next.extend(split_by_direct_encounter(division, rows, group));
                }
                _ => next.extend(split_by_metric(*criterion, &totals, group)),
            }
        }
        groups = next;
    }

    if criteria.contains(&TieBreakCriterion::Random) {
        let mut rng = StdRng::seed_from_u64(coin_seed(division));
        groups = groups
            .into_iter()
            .flat_map(|mut group| {
                group.shuffle(&mut rng);
                group.into_iter().map(|idx| vec![idx])
            })
            .collect();
    }
    log::debug!(
        "Standings for division {}: {} group(s) after cascade",
        division.number,
        groups.len()
    );
    groups.into_iter().flatten().collect()
}

fn metric(criterion: TieBreakCriterion, line: &StatLine) -> f64 {
    match criterion {
        TieBreakCriterion::Points => line.points as f64,
        TieBreakCriterion::SetDifference => line.set_difference() as f64,
        TieBreakCriterion::GameDifference => line.game_difference() as f64,
        TieBreakCriterion::MatchesWon => line.matches_won as f64,
        TieBreakCriterion::SetsWon => line.sets_won as f64,
        TieBreakCriterion::GamesWon => line.games_won as f64,
        TieBreakCriterion::WinRate => line.win_rate(),
        TieBreakCriterion::DirectEncounter | TieBreakCriterion::Random => 0.0,
    }
}

/// Higher value ranks first; equal values stay grouped together.
fn split_by_metric(criterion: TieBreakCriterion, totals: &[StatLine], mut group: Vec<usize>) -> Vec<Vec<usize>> {
    let value = |idx: usize| metric(criterion, &totals[idx]);
    group.sort_by(|&a, &b| value(b).partial_cmp(&value(a)).unwrap_or(Ordering::Equal));

    let mut out: Vec<Vec<usize>> = Vec::new();
    for idx in group {
        match out.last_mut() {
            Some(last) if value(last[0]) == value(idx) => last.push(idx),
            _ => out.push(vec![idx]),
        }
    }
    out
}

/// Only decides a tie between exactly two rows: net head-to-head wins.
fn split_by_direct_encounter(division: &Division, rows: &[StandingRow], group: Vec<usize>) -> Vec<Vec<usize>> {
    let &[a, b] = group.as_slice() else {
        return vec![group];
    };
    match head_to_head(division, &rows[a].participant, &rows[b].participant) {
        n if n > 0 => vec![vec![a], vec![b]],
        n if n < 0 => vec![vec![b], vec![a]],
        _ => vec![group],
    }
}

/// Wins of `a` over `b` minus wins of `b` over `a`, counting only matches where they
/// were on opposite sides.
fn head_to_head(division: &Division, a: &Participant, b: &Participant) -> i32 {
    division
        .finished_matches()
        .filter_map(|m| {
            let side_a = m.side_of(a)?;
            let side_b = m.side_of(b)?;
            if side_a == side_b {
                return None;
            }
            match m.winner {
                Some(w) if w == side_a => Some(1),
                Some(_) => Some(-1),
                None => None,
            }
        })
        .sum()
}

/// Lifetime statistics of a player across divisions (finished matches only).
pub fn player_lifetime_stats(player: PlayerId, divisions: &[Division]) -> PlayerStats {
    let me = Participant::Player(player);
    let mut stats = PlayerStats::default();
    for m in divisions.iter().flat_map(|d| d.finished_matches()) {
        let Some(side) = m.side_of(&me) else { continue };
        stats.matches_played += 1;
        match m.winner {
            Some(w) if w == side => stats.matches_won += 1,
            Some(_) => stats.matches_lost += 1,
            None => {}
        }
    }
    stats
}
