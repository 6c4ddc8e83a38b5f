//! Match generators, one per format. Every generated match is pending and rounds start at 1.

use crate::models::{Division, DivisionId, EngineError, Match, MatchStatus, Pair, PlayerId};
use std::collections::{HashMap, HashSet};

/// Reject input where any player appears twice.
pub(crate) fn ensure_unique<I: IntoIterator<Item = PlayerId>>(ids: I) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(EngineError::DuplicateParticipant(id));
        }
    }
    Ok(())
}

/// Circle-method round robin over `n` indices: `n - 1` rounds (`n` rounded up to even),
/// every index meets every other exactly once. A bye slot is dropped from the output.
/// Each tuple is ordered low index first.
pub(crate) fn circle_rounds(n: usize) -> Vec<Vec<(usize, usize)>> {
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();
    if m < 2 {
        return Vec::new();
    }
    let fixed = slots[0];
    let rest = &slots[1..];
    (0..m - 1)
        .map(|r| {
            let shift = (r + 1) % (m - 1);
            let mut arr = Vec::with_capacity(m);
            arr.push(fixed);
            arr.extend(rest[shift..].iter().chain(rest[..shift].iter()).copied());
            (0..m / 2)
                .filter_map(|i| match (arr[i], arr[m - 1 - i]) {
                    (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

fn pair_of(players: &[PlayerId], (a, b): (usize, usize)) -> Result<Pair, EngineError> {
    Pair::new(players[a], players[b])
}

/// Classic division of exactly 4 players: the 3 ways to split them into two pairs.
pub fn generate_classic4(division_id: DivisionId, players: &[PlayerId]) -> Result<Vec<Match>, EngineError> {
    if players.len() != 4 {
        return Err(EngineError::WrongParticipantCount {
            expected: 4,
            found: players.len(),
        });
    }
    ensure_unique(players.iter().copied())?;

    let p = players;
    let splits = [((0, 1), (2, 3)), ((0, 2), (1, 3)), ((0, 3), (1, 2))];
    splits
        .iter()
        .zip(1..)
        .map(|(&(a, b), round)| -> Result<Match, EngineError> {
            Ok(Match::new(division_id, round, pair_of(p, a)?, pair_of(p, b)?, None))
        })
        .collect()
}

/// Individual league: partners rotate every round so every player partners every other
/// player once where the count allows it; with 4 players this is exactly the classic
/// schedule. Sit-outs rotate through the field.
pub fn generate_individual_league(
    division_id: DivisionId,
    players: &[PlayerId],
) -> Result<Vec<Match>, EngineError> {
    if players.len() < 4 {
        return Err(EngineError::NotEnoughParticipants {
            required: 4,
            found: players.len(),
        });
    }
    ensure_unique(players.iter().copied())?;

    let mut matches = Vec::new();
    for (round, pods) in (1..).zip(rotation_rounds(players.len(), usize::MAX)) {
        for [x, y] in pods {
            matches.push(Match::new(
                division_id,
                round,
                pair_of(players, x)?,
                pair_of(players, y)?,
                None,
            ));
        }
    }
    log::debug!(
        "Individual league for {} players: {} matches",
        players.len(),
        matches.len()
    );
    Ok(matches)
}

type Pod = [(usize, usize); 2];

fn pod_players(pod: &Pod) -> [usize; 4] {
    [pod[0].0, pod[0].1, pod[1].0, pod[1].1]
}

/// Rounds of 2v2 pods over `n` players with rotating partners, at most `per_round` pods
/// per round.
///
/// Each circle-method round is split into pods after ordering its partnerships by how
/// often their players sat out, so rests rotate. The partnership left over in a round
/// with an odd count is carried to the end, where leftovers are paired up whenever their
/// players differ. No partnership is scheduled twice.
fn rotation_rounds(n: usize, per_round: usize) -> Vec<Vec<Pod>> {
    let per_round = per_round.max(1);
    let mut sat_out = vec![0u32; n];
    let mut rounds: Vec<Vec<Pod>> = Vec::new();
    let mut carried: Vec<(usize, usize)> = Vec::new();

    let play = |pods: Vec<Pod>, sat_out: &mut [u32], rounds: &mut Vec<Vec<Pod>>| {
        let mut playing = vec![false; n];
        for idx in pods.iter().flat_map(pod_players) {
            playing[idx] = true;
        }
        for (idx, played) in playing.iter().enumerate() {
            if !played {
                sat_out[idx] += 1;
            }
        }
        rounds.push(pods);
    };

    for mut partnerships in circle_rounds(n) {
        // Stable sort keeps rotation order among equally rested partnerships.
        partnerships.sort_by_key(|&(a, b)| std::cmp::Reverse(sat_out[a] + sat_out[b]));
        let pods: Vec<Pod> = partnerships
            .chunks_exact(2)
            .map(|pod| [pod[0], pod[1]])
            .collect();
        carried.extend(partnerships.chunks_exact(2).remainder());
        for chunk in pods.chunks(per_round) {
            play(chunk.to_vec(), &mut sat_out, &mut rounds);
        }
    }

    let mut extra: Vec<Pod> = Vec::new();
    let mut used = vec![false; carried.len()];
    for i in 0..carried.len() {
        if used[i] {
            continue;
        }
        let (a, b) = carried[i];
        let partner = (i + 1..carried.len())
            .find(|&j| !used[j] && ![a, b].contains(&carried[j].0) && ![a, b].contains(&carried[j].1));
        if let Some(j) = partner {
            used[i] = true;
            used[j] = true;
            extra.push([carried[i], carried[j]]);
        }
    }

    while !extra.is_empty() {
        let mut busy = vec![false; n];
        let mut round = Vec::new();
        let mut rest = Vec::new();
        for pod in extra {
            let players = pod_players(&pod);
            if round.len() < per_round && players.iter().all(|&p| !busy[p]) {
                for p in players {
                    busy[p] = true;
                }
                round.push(pod);
            } else {
                rest.push(pod);
            }
        }
        play(round, &mut sat_out, &mut rounds);
        extra = rest;
    }
    rounds
}

/// Validate fixed pairs: at least `required` pairs and no player in two pairs.
pub(crate) fn validate_pairs(pairs: &[Pair], required: usize) -> Result<(), EngineError> {
    if pairs.len() < required {
        return Err(EngineError::NotEnoughParticipants {
            required,
            found: pairs.len(),
        });
    }
    for pair in pairs {
        if pair.p1 == pair.p2 {
            return Err(EngineError::InvalidPair(pair.p1));
        }
    }
    ensure_unique(pairs.iter().flat_map(|p| p.players()))
}

/// Fixed-pairs league: round robin pair vs pair, with a bye when the count is odd.
pub fn generate_pairs_league(division_id: DivisionId, pairs: &[Pair]) -> Result<Vec<Match>, EngineError> {
    validate_pairs(pairs, 2)?;
    let matches: Vec<Match> = (1..)
        .zip(circle_rounds(pairs.len()))
        .flat_map(|(round, meetings)| {
            meetings
                .into_iter()
                .map(move |(a, b)| Match::new(division_id, round, pairs[a], pairs[b], None))
        })
        .collect();
    log::debug!("Pairs league for {} pairs: {} matches", pairs.len(), matches.len());
    Ok(matches)
}

/// Americano: rotating partners over a fixed number of courts.
///
/// Uses the same partner rotation as the individual league; a rotation round that needs
/// more courts than configured is spread over several rounds, so no partnership is lost
/// to court capacity. Players who sat out most are seated first.
pub fn generate_americano(
    division_id: DivisionId,
    players: &[PlayerId],
    courts: u32,
) -> Result<Vec<Match>, EngineError> {
    if courts == 0 {
        return Err(EngineError::MissingConfig("courts"));
    }
    if players.len() < 4 {
        return Err(EngineError::NotEnoughParticipants {
            required: 4,
            found: players.len(),
        });
    }
    ensure_unique(players.iter().copied())?;

    let mut matches = Vec::new();
    for (round, pods) in (1..).zip(rotation_rounds(players.len(), courts as usize)) {
        for (court, [x, y]) in (1..).zip(pods) {
            matches.push(Match::new(
                division_id,
                round,
                pair_of(players, x)?,
                pair_of(players, y)?,
                Some(court),
            ));
        }
    }
    log::debug!(
        "Americano for {} players on {} court(s): {} matches",
        players.len(),
        courts,
        matches.len()
    );
    Ok(matches)
}

/// Mexicano: generate only the next round, grouping players of similar running score.
///
/// Running score is the sum of points awarded so far. Players who sat out most are
/// seated first; seated players are ranked by score (division order breaks ties) and
/// split 4 per court, best group on court 1, paired 1st+4th vs 2nd+3rd.
pub fn generate_mexicano_round(division: &Division, courts: u32) -> Result<Vec<Match>, EngineError> {
    if courts == 0 {
        return Err(EngineError::MissingConfig("courts"));
    }
    let players = &division.players;
    if players.len() < 4 {
        return Err(EngineError::NotEnoughParticipants {
            required: 4,
            found: players.len(),
        });
    }
    ensure_unique(players.iter().copied())?;

    let current = division.current_round();
    if division
        .matches_in_round(current)
        .any(|m| m.status == MatchStatus::Pending)
    {
        return Err(EngineError::RoundIncomplete { round: current });
    }

    let mut score: HashMap<PlayerId, i32> = HashMap::new();
    let mut appearances: HashMap<PlayerId, u32> = HashMap::new();
    for m in &division.matches {
        for id in m.players() {
            *appearances.entry(id).or_default() += 1;
        }
        if let Some((p1, p2)) = m.points_awarded {
            for id in m.pair1.players() {
                *score.entry(id).or_default() += p1;
            }
            for id in m.pair2.players() {
                *score.entry(id).or_default() += p2;
            }
        }
    }

    let sat_out = |idx: usize| current - appearances.get(&players[idx]).copied().unwrap_or(0);
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by_key(|&idx| std::cmp::Reverse(sat_out(idx)));
    let seats = (courts as usize * 4).min(players.len() - players.len() % 4);
    let mut seated: Vec<usize> = order[..seats].to_vec();
    seated.sort_by_key(|&idx| (std::cmp::Reverse(score.get(&players[idx]).copied().unwrap_or(0)), idx));

    let round = current + 1;
    let matches = (1..)
        .zip(seated.chunks_exact(4))
        .map(|(court, g)| -> Result<Match, EngineError> {
            Ok(Match::new(
                division.id,
                round,
                pair_of(players, (g[0], g[3]))?,
                pair_of(players, (g[1], g[2]))?,
                Some(court),
            ))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    log::debug!("Mexicano round {} for division {}: {} matches", round, division.number, matches.len());
    Ok(matches)
}
