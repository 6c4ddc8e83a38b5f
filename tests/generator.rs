//! Integration tests for match generation: classic, leagues, Americano and Mexicano.

use padel_league::logic::{
    advance_round, generate_americano, generate_classic4, generate_individual_league, generate_mexicano_round,
    generate_pairs_league, record_result,
};
use padel_league::models::{
    Division, EngineError, FormatConfig, Match, MatchStatus, Pair, PlayerId, RankingConfig, Score,
};
use std::collections::HashSet;
use uuid::Uuid;

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn partnership(pair: &Pair) -> (PlayerId, PlayerId) {
    (pair.p1.min(pair.p2), pair.p1.max(pair.p2))
}

fn partnerships(matches: &[Match]) -> Vec<(PlayerId, PlayerId)> {
    matches
        .iter()
        .flat_map(|m| [partnership(&m.pair1), partnership(&m.pair2)])
        .collect()
}

#[test]
fn classic4_covers_every_partnership_once() {
    let p = ids(4);
    let matches = generate_classic4(Uuid::new_v4(), &p).unwrap();
    assert_eq!(matches.len(), 3);

    let seen = partnerships(&matches);
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 6);
    assert_eq!(unique.len(), 6, "no partnership may repeat");

    for (m, round) in matches.iter().zip(1..) {
        assert_eq!(m.round, round);
        assert_eq!(m.status, MatchStatus::Pending);
        assert!(m.score.is_none());
        let players: HashSet<_> = m.players().into_iter().collect();
        assert_eq!(players.len(), 4);
    }
    assert_eq!(matches[0].pair1, Pair::new(p[0], p[1]).unwrap());
    assert_eq!(matches[0].pair2, Pair::new(p[2], p[3]).unwrap());
    assert_eq!(matches[2].pair1, Pair::new(p[0], p[3]).unwrap());
    assert_eq!(matches[2].pair2, Pair::new(p[1], p[2]).unwrap());
}

#[test]
fn classic4_rejects_three_players() {
    let p = ids(3);
    assert_eq!(
        generate_classic4(Uuid::new_v4(), &p).unwrap_err(),
        EngineError::WrongParticipantCount { expected: 4, found: 3 }
    );
}

#[test]
fn classic4_rejects_duplicate_player() {
    let p = ids(3);
    let roster = [p[0], p[1], p[2], p[0]];
    assert_eq!(
        generate_classic4(Uuid::new_v4(), &roster).unwrap_err(),
        EngineError::DuplicateParticipant(p[0])
    );
}

#[test]
fn individual_league_of_four_is_the_classic_schedule() {
    let p = ids(4);
    let div = Uuid::new_v4();
    let league = generate_individual_league(div, &p).unwrap();
    let classic = generate_classic4(div, &p).unwrap();
    assert_eq!(league.len(), classic.len());
    for (a, b) in league.iter().zip(&classic) {
        assert_eq!(a.round, b.round);
        assert_eq!(partnership(&a.pair1), partnership(&b.pair1));
        assert_eq!(partnership(&a.pair2), partnership(&b.pair2));
    }
}

#[test]
fn individual_league_partners_everyone_once() {
    let p = ids(8);
    let matches = generate_individual_league(Uuid::new_v4(), &p).unwrap();
    assert_eq!(matches.len(), 14); // 7 rounds x 2 pods

    let seen = partnerships(&matches);
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(unique.len(), 28);
    assert_eq!(seen.len(), 28);

    for round in 1..=7 {
        let players: Vec<PlayerId> = matches
            .iter()
            .filter(|m| m.round == round)
            .flat_map(|m| m.players())
            .collect();
        let unique: HashSet<_> = players.iter().collect();
        assert_eq!(players.len(), 8);
        assert_eq!(unique.len(), 8, "a player is scheduled twice in round {round}");
    }
}

/// Matches per player, in roster order.
fn appearances(players: &[PlayerId], matches: &[Match]) -> Vec<usize> {
    players
        .iter()
        .map(|id| matches.iter().filter(|m| m.players().contains(id)).count())
        .collect()
}

fn assert_no_double_booking(matches: &[Match]) {
    let last = matches.iter().map(|m| m.round).max().unwrap_or(0);
    for round in 1..=last {
        let players: Vec<PlayerId> = matches
            .iter()
            .filter(|m| m.round == round)
            .flat_map(|m| m.players())
            .collect();
        let unique: HashSet<_> = players.iter().collect();
        assert_eq!(players.len(), unique.len(), "a player is scheduled twice in round {round}");
    }
}

#[test]
fn individual_league_rotates_sit_outs() {
    let p = ids(6);
    let matches = generate_individual_league(Uuid::new_v4(), &p).unwrap();
    assert_eq!(matches.len(), 7);
    assert_no_double_booking(&matches);

    let counts = appearances(&p, &matches);
    let most = counts.iter().max().unwrap();
    let least = counts.iter().min().unwrap();
    assert!(most - least <= 1, "unbalanced schedule: {counts:?}");

    let seen = partnerships(&matches);
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), unique.len());
    assert_eq!(unique.len(), 14);
}

#[test]
fn rotating_schedules_never_repeat_a_partnership() {
    for n in 4..=11 {
        let p = ids(n);
        let league = generate_individual_league(Uuid::new_v4(), &p).unwrap();
        let americano = generate_americano(Uuid::new_v4(), &p, 1).unwrap();
        for matches in [&league, &americano] {
            assert_no_double_booking(matches);
            let seen = partnerships(matches);
            let unique: HashSet<_> = seen.iter().copied().collect();
            assert_eq!(seen.len(), unique.len(), "repeated partnership with {n} players");
        }
        assert!(americano.iter().all(|m| m.court == Some(1)));
    }
}

#[test]
fn individual_league_needs_four_players() {
    assert!(matches!(
        generate_individual_league(Uuid::new_v4(), &ids(3)),
        Err(EngineError::NotEnoughParticipants { required: 4, found: 3 })
    ));
}

#[test]
fn pairs_league_is_a_round_robin_over_pairs() {
    let p = ids(8);
    let pairs: Vec<Pair> = p.chunks(2).map(|c| Pair::from_slice(c).unwrap()).collect();
    let matches = generate_pairs_league(Uuid::new_v4(), &pairs).unwrap();
    assert_eq!(matches.len(), 6);

    let meetings: HashSet<_> = matches
        .iter()
        .map(|m| {
            let a = pairs.iter().position(|x| *x == m.pair1).unwrap();
            let b = pairs.iter().position(|x| *x == m.pair2).unwrap();
            (a.min(b), a.max(b))
        })
        .collect();
    assert_eq!(meetings.len(), 6);
    assert_eq!(matches.iter().map(|m| m.round).max(), Some(3));
}

#[test]
fn pairs_league_with_odd_count_uses_a_bye() {
    let p = ids(6);
    let pairs: Vec<Pair> = p.chunks(2).map(|c| Pair::from_slice(c).unwrap()).collect();
    let matches = generate_pairs_league(Uuid::new_v4(), &pairs).unwrap();
    assert_eq!(matches.len(), 3);
    for round in 1..=3 {
        assert_eq!(matches.iter().filter(|m| m.round == round).count(), 1);
    }
}

#[test]
fn pairs_league_rejects_player_in_two_pairs() {
    let p = ids(3);
    let pairs = vec![Pair::new(p[0], p[1]).unwrap(), Pair::new(p[0], p[2]).unwrap()];
    assert_eq!(
        generate_pairs_league(Uuid::new_v4(), &pairs).unwrap_err(),
        EngineError::DuplicateParticipant(p[0])
    );
}

#[test]
fn pair_needs_exactly_two_distinct_players() {
    let p = ids(3);
    assert_eq!(
        Pair::from_slice(&p[..1]).unwrap_err(),
        EngineError::WrongParticipantCount { expected: 2, found: 1 }
    );
    assert_eq!(
        Pair::from_slice(&p).unwrap_err(),
        EngineError::WrongParticipantCount { expected: 2, found: 3 }
    );
    assert_eq!(Pair::new(p[0], p[0]).unwrap_err(), EngineError::InvalidPair(p[0]));
}

#[test]
fn americano_spreads_partnerships_over_extra_rounds_on_one_court() {
    let p = ids(8);
    let matches = generate_americano(Uuid::new_v4(), &p, 1).unwrap();
    assert_eq!(matches.len(), 14);
    for m in &matches {
        assert_eq!(m.court, Some(1));
        let players: HashSet<_> = m.players().into_iter().collect();
        assert_eq!(players.len(), 4);
    }
    let rounds: HashSet<u32> = matches.iter().map(|m| m.round).collect();
    assert_eq!(rounds.len(), 14);

    let seen = partnerships(&matches);
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(unique.len(), 28);
    assert_eq!(seen.len(), 28);
}

#[test]
fn americano_with_enough_courts_plays_every_partnership() {
    let p = ids(8);
    let matches = generate_americano(Uuid::new_v4(), &p, 2).unwrap();
    assert_eq!(matches.len(), 14);
    let unique: HashSet<_> = partnerships(&matches).into_iter().collect();
    assert_eq!(unique.len(), 28);
    for m in &matches {
        assert!(matches!(m.court, Some(1) | Some(2)));
    }
}

#[test]
fn americano_requires_courts() {
    assert_eq!(
        generate_americano(Uuid::new_v4(), &ids(8), 0).unwrap_err(),
        EngineError::MissingConfig("courts")
    );
}

fn mexicano_config() -> (RankingConfig, FormatConfig) {
    let format = FormatConfig::Mexicano { courts: 2 };
    (RankingConfig::builder().format(format).build().unwrap(), format)
}

#[test]
fn mexicano_groups_players_by_running_score() {
    let p = ids(8);
    let (config, format) = mexicano_config();
    let mut division = Division::new(1, p.clone());
    division.matches = generate_mexicano_round(&division, 2).unwrap();

    assert_eq!(division.matches.len(), 2);
    assert_eq!(division.matches[0].court, Some(1));
    assert_eq!(division.matches[0].pair1, Pair::new(p[0], p[3]).unwrap());
    assert_eq!(division.matches[0].pair2, Pair::new(p[1], p[2]).unwrap());

    // Round 1 unfinished: no next round yet
    assert_eq!(
        advance_round(&mut division, &format).unwrap_err(),
        EngineError::RoundIncomplete { round: 1 }
    );

    record_result(&mut division.matches[0], Score::points(15, 9), &config).unwrap();
    record_result(&mut division.matches[1], Score::points(20, 4), &config).unwrap();
    assert_eq!(advance_round(&mut division, &format).unwrap(), 2);

    // Scores: p4/p7 20, p0/p3 15, p1/p2 9, p5/p6 4
    let round2: Vec<&Match> = division.matches_in_round(2).collect();
    assert_eq!(round2.len(), 2);
    assert_eq!(round2[0].court, Some(1));
    assert_eq!(round2[0].pair1, Pair::new(p[4], p[3]).unwrap());
    assert_eq!(round2[0].pair2, Pair::new(p[7], p[0]).unwrap());
    assert_eq!(round2[1].pair1, Pair::new(p[1], p[6]).unwrap());
    assert_eq!(round2[1].pair2, Pair::new(p[2], p[5]).unwrap());
}

#[test]
fn mexicano_seats_players_who_sat_out_first() {
    let p = ids(5);
    let format = FormatConfig::Mexicano { courts: 1 };
    let config = RankingConfig::builder().format(format).build().unwrap();
    let mut division = Division::new(1, p.clone());
    division.matches = generate_mexicano_round(&division, 1).unwrap();
    assert_eq!(division.matches.len(), 1);
    assert!(!division.matches[0].players().contains(&p[4]));

    record_result(&mut division.matches[0], Score::points(13, 11), &config).unwrap();
    advance_round(&mut division, &format).unwrap();
    let next = division.matches_in_round(2).next().unwrap();
    assert!(next.players().contains(&p[4]));
}
