//! Group stage followed by an elimination playoff.

use super::bracket::{generate_bracket, Brackets};
use super::generator::{generate_pairs_league, validate_pairs};
use super::standings::compute_standings;
use crate::models::{
    Division, EngineError, FormatConfig, FormatKind, MatchStatus, Pair, Participant, PhaseTag, Ranking, Seeding,
    StandingRow,
};
use rand::Rng;

/// Snake-distribute seeded pairs into `groups` divisions and schedule a round robin in each.
/// Pair 1 goes to group 1, pair 2 to group 2, ..., then back from the last group.
pub fn generate_group_stage(pairs: &[Pair], groups: u32) -> Result<Vec<Division>, EngineError> {
    if groups == 0 {
        return Err(EngineError::MissingConfig("groups"));
    }
    let g = groups as usize;
    validate_pairs(pairs, g * 2)?;

    let mut buckets: Vec<Vec<Pair>> = vec![Vec::new(); g];
    for (i, pair) in pairs.iter().enumerate() {
        let lap = i / g;
        let pos = i % g;
        let group = if lap % 2 == 0 { pos } else { g - 1 - pos };
        buckets[group].push(*pair);
    }

    (1..)
        .zip(buckets)
        .map(|(number, group_pairs)| -> Result<Division, EngineError> {
            let mut division = Division::with_pairs(number, group_pairs).with_phase(PhaseTag::GroupStage);
            division.matches = generate_pairs_league(division.id, &division.pairs)?;
            Ok(division)
        })
        .collect()
}

/// Playoff seed list: every group winner (in group order), then every runner-up, and so on.
pub fn playoff_seeds(group_standings: &[Vec<StandingRow>], qualifiers_per_group: usize) -> Vec<Participant> {
    (0..qualifiers_per_group)
        .flat_map(|rank| {
            group_standings
                .iter()
                .filter_map(move |rows| rows.get(rank).map(|r| r.participant))
        })
        .collect()
}

/// Build the playoff draw of a groups + playoff ranking from its current group standings.
pub fn build_playoff<R: Rng + ?Sized>(ranking: &Ranking, rng: &mut R) -> Result<Brackets, EngineError> {
    let FormatConfig::GroupsPlayoff {
        qualifiers_per_group,
        consolation,
        ..
    } = ranking.config.format
    else {
        return Err(EngineError::FormatMismatch {
            expected: FormatKind::GroupsPlayoff,
            found: ranking.config.format.kind(),
        });
    };

    let mut tables = Vec::with_capacity(ranking.divisions.len());
    for division in &ranking.divisions {
        if let Some(m) = division.matches.iter().find(|m| m.status == MatchStatus::Pending) {
            return Err(EngineError::RoundIncomplete { round: m.round });
        }
        let adjustments = ranking.adjustments(&division.participants());
        tables.push(compute_standings(division, &ranking.config, &adjustments, None)?);
    }
    let seeds = playoff_seeds(&tables, qualifiers_per_group as usize);
    log::info!(
        "Playoff for ranking {}: {} qualifiers from {} group(s)",
        ranking.id,
        seeds.len(),
        tables.len()
    );
    generate_bracket(&seeds, Seeding::Seeded, consolation, rng)
}
