//! Setup phase and per-format dispatch: build the first divisions, generate schedules,
//! advance round-based formats and record results against a ranking.

use super::generator::{
    ensure_unique, generate_americano, generate_classic4, generate_individual_league,
    generate_mexicano_round, generate_pairs_league,
};
use super::groups::generate_group_stage;
use super::pozo::{advance_pozo, initial_round};
use super::scoring::{correct_result, record_result, Resolution};
use crate::models::{
    Division, EngineError, Entrants, FormatConfig, FormatKind, Match, MatchId, Ranking, Score,
};
use rand::Rng;

/// Generate the first schedule of an empty division according to the format.
pub fn generate_division_matches<R: Rng + ?Sized>(
    division: &mut Division,
    format: &FormatConfig,
    rng: &mut R,
) -> Result<(), EngineError> {
    if !division.matches.is_empty() {
        return Err(EngineError::InvalidState);
    }
    if format.uses_pairs() && division.pairs.is_empty() {
        return Err(EngineError::EntrantKindMismatch { pairs_expected: true });
    }
    let matches = match *format {
        FormatConfig::Classic => generate_classic4(division.id, &division.players)?,
        FormatConfig::IndividualLeague => generate_individual_league(division.id, &division.players)?,
        FormatConfig::PairsLeague | FormatConfig::GroupsPlayoff { .. } => {
            generate_pairs_league(division.id, &division.pairs)?
        }
        FormatConfig::Americano { courts } => generate_americano(division.id, &division.players, courts)?,
        FormatConfig::Mexicano { courts } => generate_mexicano_round(division, courts)?,
        FormatConfig::Pozo { courts, variant } => initial_round(division, courts, variant, rng)?,
        FormatConfig::Elimination { .. } => return Err(EngineError::UnsupportedFormat(FormatKind::Elimination)),
    };
    log::debug!(
        "Division {} ({}): {} matches generated",
        division.number,
        format.kind(),
        matches.len()
    );
    division.matches = matches;
    Ok(())
}

/// Add the next round to a round-by-round format (Mexicano, Pozo). Returns the new round.
pub fn advance_round(division: &mut Division, format: &FormatConfig) -> Result<u32, EngineError> {
    match *format {
        FormatConfig::Pozo { variant, .. } => advance_pozo(division, variant),
        FormatConfig::Mexicano { courts } => {
            let next = generate_mexicano_round(division, courts)?;
            let round = division.current_round() + 1;
            division.matches.extend(next);
            Ok(round)
        }
        other => Err(EngineError::UnsupportedFormat(other.kind())),
    }
}

/// Split `items` into `parts` contiguous chunks; earlier chunks take the remainder.
fn split_evenly<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    let base = items.len() / parts;
    let extra = items.len() % parts;
    let mut out = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        out.push(items[start..start + len].to_vec());
        start += len;
    }
    out
}

/// Start the ranking: split the entrant pool (in seed order) into first-phase divisions
/// and generate their schedules.
///
/// Classic rankings always use divisions of 4 and ignore `division_count`; groups +
/// playoff rankings use the configured group count.
pub fn start_ranking<R: Rng + ?Sized>(
    ranking: &mut Ranking,
    entrants: Entrants,
    division_count: u32,
    rng: &mut R,
) -> Result<(), EngineError> {
    if ranking.phase != 0 {
        return Err(EngineError::InvalidState);
    }
    let format = ranking.config.format;
    if entrants.is_pairs() != format.uses_pairs() {
        return Err(EngineError::EntrantKindMismatch {
            pairs_expected: format.uses_pairs(),
        });
    }
    ensure_unique(entrants.participants().iter().flat_map(|p| p.players()))?;

    let mut divisions = match (&format, &entrants) {
        (FormatConfig::Elimination { .. }, _) => {
            return Err(EngineError::UnsupportedFormat(FormatKind::Elimination))
        }
        (FormatConfig::GroupsPlayoff { groups, .. }, Entrants::Pairs(pairs)) => {
            generate_group_stage(pairs, *groups)?
        }
        (FormatConfig::Classic, Entrants::Players(players)) => {
            if players.is_empty() || players.len() % 4 != 0 {
                return Err(EngineError::WrongParticipantCount {
                    expected: players.len().div_ceil(4).max(1) * 4,
                    found: players.len(),
                });
            }
            (1..)
                .zip(players.chunks(4))
                .map(|(n, chunk)| Division::new(n, chunk.to_vec()))
                .collect()
        }
        (_, Entrants::Players(players)) => {
            if division_count == 0 {
                return Err(EngineError::MissingConfig("division count"));
            }
            (1..)
                .zip(split_evenly(players, division_count as usize))
                .map(|(n, chunk)| Division::new(n, chunk))
                .collect()
        }
        (_, Entrants::Pairs(pairs)) => {
            if division_count == 0 {
                return Err(EngineError::MissingConfig("division count"));
            }
            (1..)
                .zip(split_evenly(pairs, division_count as usize))
                .map(|(n, chunk)| Division::with_pairs(n, chunk))
                .collect()
        }
    };

    for division in divisions.iter_mut().filter(|d| d.matches.is_empty()) {
        generate_division_matches(division, &format, rng)?;
    }
    log::info!(
        "Ranking {} started: {} entrants in {} division(s), format {}",
        ranking.id,
        entrants.len(),
        divisions.len(),
        format.kind()
    );
    ranking.divisions = divisions;
    ranking.phase = 1;
    ranking.touch();
    Ok(())
}

fn find_match_mut(ranking: &mut Ranking, match_id: MatchId) -> Result<&mut Match, EngineError> {
    ranking
        .divisions
        .iter_mut()
        .find_map(|d| d.get_match_mut(match_id))
        .ok_or(EngineError::MatchNotFound(match_id))
}

/// Record a result with the ranking's scoring rules.
pub fn record_match_result(ranking: &mut Ranking, match_id: MatchId, score: Score) -> Result<Resolution, EngineError> {
    let config = ranking.config.clone();
    let resolution = record_result(find_match_mut(ranking, match_id)?, score, &config)?;
    ranking.touch();
    Ok(resolution)
}

/// Explicitly replace the result of a finished match.
pub fn correct_match_result(ranking: &mut Ranking, match_id: MatchId, score: Score) -> Result<Resolution, EngineError> {
    let config = ranking.config.clone();
    let resolution = correct_result(find_match_mut(ranking, match_id)?, score, &config)?;
    ranking.touch();
    Ok(resolution)
}

/// Mark a pending match as not played; it is ignored by standings.
pub fn mark_match_not_played(ranking: &mut Ranking, match_id: MatchId) -> Result<(), EngineError> {
    find_match_mut(ranking, match_id)?.mark_not_played()?;
    ranking.touch();
    Ok(())
}
