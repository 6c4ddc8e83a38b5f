//! Integration tests for the ranking lifecycle: players, start, results, groups + playoff.

use padel_league::logic::{
    advance_round, build_playoff, compute_standings, generate_group_stage, mark_match_not_played, playoff_seeds,
    record_match_result, start_ranking, Slot,
};
use padel_league::models::{
    EngineError, Entrants, FormatConfig, FormatKind, MatchStatus, Pair, Participant, PhaseTag, PlayerId,
    PozoVariant, Ranking, RankingConfig, Score, Seeding, StatAdjustment,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn ranking(format: FormatConfig) -> Ranking {
    Ranking::new("Torneo", RankingConfig::builder().format(format).build().unwrap())
}

fn register(ranking: &mut Ranking, n: usize) -> Vec<PlayerId> {
    (0..n)
        .map(|i| ranking.add_player(format!("Player {i}")).unwrap())
        .collect()
}

fn pairs_of(players: &[PlayerId]) -> Vec<Pair> {
    players.chunks(2).map(|c| Pair::from_slice(c).unwrap()).collect()
}

#[test]
fn player_names_are_unique_ignoring_case() {
    let mut r = ranking(FormatConfig::Classic);
    r.add_player("Ana").unwrap();
    assert_eq!(r.add_player("  ana ").unwrap_err(), EngineError::DuplicatePlayerName);
    assert_eq!(r.add_player("   ").unwrap_err(), EngineError::InvalidState);
    assert_eq!(r.players.len(), 1);
    assert_eq!(r.players[0].win_rate(), 0.0);
}

#[test]
fn classic_start_splits_into_divisions_of_four() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut r = ranking(FormatConfig::Classic);
    let players = register(&mut r, 12);
    start_ranking(&mut r, Entrants::Players(players.clone()), 1, &mut rng).unwrap();

    assert_eq!(r.phase, 1);
    assert_eq!(r.divisions.len(), 3);
    for (division, chunk) in r.divisions.iter().zip(players.chunks(4)) {
        assert_eq!(division.players, chunk);
        assert_eq!(division.matches.len(), 3);
    }
    assert_eq!(r.division(3).unwrap().number, 3);
    assert_eq!(r.division(4).unwrap_err(), EngineError::DivisionNotFound(4));

    assert_eq!(
        start_ranking(&mut r, Entrants::Players(players), 1, &mut rng).unwrap_err(),
        EngineError::InvalidState
    );
}

#[test]
fn classic_start_rejects_an_incomplete_division() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut r = ranking(FormatConfig::Classic);
    let players = register(&mut r, 10);
    assert_eq!(
        start_ranking(&mut r, Entrants::Players(players), 1, &mut rng).unwrap_err(),
        EngineError::WrongParticipantCount { expected: 12, found: 10 }
    );
    assert_eq!(r.phase, 0);
    assert!(r.divisions.is_empty());
}

#[test]
fn entrant_kind_must_match_the_format() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut r = ranking(FormatConfig::PairsLeague);
    let players = register(&mut r, 8);
    assert_eq!(
        start_ranking(&mut r, Entrants::Players(players.clone()), 1, &mut rng).unwrap_err(),
        EngineError::EntrantKindMismatch { pairs_expected: true }
    );

    let mut single = ranking(FormatConfig::IndividualLeague);
    assert_eq!(
        start_ranking(&mut single, Entrants::Pairs(pairs_of(&players)), 1, &mut rng).unwrap_err(),
        EngineError::EntrantKindMismatch { pairs_expected: false }
    );

    let mut knockout = ranking(FormatConfig::Elimination {
        seeding: Seeding::Seeded,
        consolation: false,
    });
    assert_eq!(
        start_ranking(&mut knockout, Entrants::Pairs(pairs_of(&players)), 1, &mut rng).unwrap_err(),
        EngineError::UnsupportedFormat(FormatKind::Elimination)
    );
}

#[test]
fn league_start_splits_evenly() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut r = ranking(FormatConfig::IndividualLeague);
    let players = register(&mut r, 11);
    start_ranking(&mut r, Entrants::Players(players), 2, &mut rng).unwrap();
    let sizes: Vec<usize> = r.divisions.iter().map(|d| d.players.len()).collect();
    assert_eq!(sizes, vec![6, 5]);
    assert!(r.divisions.iter().all(|d| !d.matches.is_empty()));

    let format = r.config.format;
    assert_eq!(
        advance_round(r.division_mut(1).unwrap(), &format).unwrap_err(),
        EngineError::UnsupportedFormat(FormatKind::IndividualLeague)
    );
}

#[test]
fn pozo_start_seats_every_court() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut r = ranking(FormatConfig::Pozo {
        courts: 2,
        variant: PozoVariant::Individual,
    });
    let players = register(&mut r, 8);
    start_ranking(&mut r, Entrants::Players(players), 1, &mut rng).unwrap();
    let division = r.division(1).unwrap();
    assert_eq!(division.matches.len(), 2);
    assert!(division.matches.iter().all(|m| m.round == 1 && m.court.is_some()));
}

#[test]
fn results_are_recorded_by_match_id() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut r = ranking(FormatConfig::Classic);
    let players = register(&mut r, 4);
    start_ranking(&mut r, Entrants::Players(players), 1, &mut rng).unwrap();
    let first = r.divisions[0].matches[0].id;
    let second = r.divisions[0].matches[1].id;

    record_match_result(&mut r, first, Score::sets(&[(6, 1), (6, 1)])).unwrap();
    mark_match_not_played(&mut r, second).unwrap();
    let statuses: Vec<MatchStatus> = r.divisions[0].matches.iter().map(|m| m.status).collect();
    assert_eq!(
        statuses,
        vec![MatchStatus::Finished, MatchStatus::NotPlayed, MatchStatus::Pending]
    );

    let unknown = Uuid::new_v4();
    assert_eq!(
        record_match_result(&mut r, unknown, Score::sets(&[(6, 1)])).unwrap_err(),
        EngineError::MatchNotFound(unknown)
    );
}

#[test]
fn pair_adjustment_is_the_sum_of_its_players() {
    let mut r = ranking(FormatConfig::PairsLeague);
    let players = register(&mut r, 4);
    let bonus = StatAdjustment {
        points: 2,
        ..Default::default()
    };
    r.set_adjustment(players[0], bonus).unwrap();
    r.set_adjustment(players[1], bonus).unwrap();
    let pairs = pairs_of(&players);
    let participants: Vec<Participant> = pairs.iter().copied().map(Participant::Pair).collect();

    let adjustments = r.adjustments(&participants);
    assert_eq!(adjustments[&participants[0]].points, 4);
    assert!(!adjustments.contains_key(&participants[1]));
    assert_eq!(
        r.set_adjustment(Uuid::new_v4(), bonus).unwrap_err(),
        EngineError::ParticipantNotFound
    );
}

#[test]
fn group_stage_snake_distributes_seeds() {
    let players: Vec<PlayerId> = (0..16).map(|_| Uuid::new_v4()).collect();
    let pairs = pairs_of(&players);
    let groups = generate_group_stage(&pairs, 2).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].pairs, vec![pairs[0], pairs[3], pairs[4], pairs[7]]);
    assert_eq!(groups[1].pairs, vec![pairs[1], pairs[2], pairs[5], pairs[6]]);
    for g in &groups {
        assert_eq!(g.phase, Some(PhaseTag::GroupStage));
        assert_eq!(g.matches.len(), 6);
    }
    assert!(matches!(
        generate_group_stage(&pairs[..3], 2),
        Err(EngineError::NotEnoughParticipants { required: 4, found: 3 })
    ));
}

#[test]
fn playoff_is_seeded_from_group_standings() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut r = ranking(FormatConfig::GroupsPlayoff {
        groups: 2,
        qualifiers_per_group: 2,
        consolation: false,
    });
    let players = register(&mut r, 16);
    start_ranking(&mut r, Entrants::Pairs(pairs_of(&players)), 1, &mut rng).unwrap();
    assert_eq!(r.divisions.len(), 2);
    assert_eq!(
        build_playoff(&r, &mut rng).unwrap_err(),
        EngineError::RoundIncomplete { round: 1 }
    );

    let match_ids: Vec<_> = r
        .divisions
        .iter()
        .flat_map(|d| d.matches.iter().map(|m| m.id))
        .collect();
    for id in match_ids {
        record_match_result(&mut r, id, Score::sets(&[(6, 3), (6, 3)])).unwrap();
    }

    let tables: Vec<_> = r
        .divisions
        .iter()
        .map(|d| compute_standings(d, &r.config, &r.adjustments(&d.participants()), None).unwrap())
        .collect();
    let seeds = playoff_seeds(&tables, 2);
    assert_eq!(seeds[0], tables[0][0].participant);
    assert_eq!(seeds[1], tables[1][0].participant);
    assert_eq!(seeds[2], tables[0][1].participant);
    assert_eq!(seeds[3], tables[1][1].participant);

    let brackets = build_playoff(&r, &mut rng).unwrap();
    assert_eq!(brackets.main.size, 4);
    assert!(brackets.consolation.is_none());
    let first = &brackets.main.rounds[0].matches;
    // Group winners meet the other group's runner-up
    assert_eq!((first[0].slot1, first[0].slot2), (Slot::Entrant(seeds[0]), Slot::Entrant(seeds[3])));
    assert_eq!((first[1].slot1, first[1].slot2), (Slot::Entrant(seeds[1]), Slot::Entrant(seeds[2])));

    let league = ranking(FormatConfig::PairsLeague);
    assert!(matches!(
        build_playoff(&league, &mut rng),
        Err(EngineError::FormatMismatch {
            expected: FormatKind::GroupsPlayoff,
            ..
        })
    ));
}
