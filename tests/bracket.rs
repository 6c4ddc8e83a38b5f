//! Integration tests for elimination brackets: seeding, byes, round names, consolation draw.

use padel_league::logic::{bracket_size, generate_bracket, round_name, seed_order, Draw, Slot};
use padel_league::models::{EngineError, Participant, Seeding, Side};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use uuid::Uuid;

fn entrants(n: usize) -> Vec<Participant> {
    (0..n).map(|_| Participant::Player(Uuid::new_v4())).collect()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[test]
fn sizes_and_seed_order() {
    assert_eq!(bracket_size(2), 2);
    assert_eq!(bracket_size(5), 8);
    assert_eq!(bracket_size(8), 8);
    assert_eq!(bracket_size(9), 16);
    assert_eq!(seed_order(4), vec![1, 4, 2, 3]);
    assert_eq!(seed_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
}

#[test]
fn round_names_follow_rounds_remaining() {
    assert_eq!(round_name(1), "Final");
    assert_eq!(round_name(2), "Semifinal");
    assert_eq!(round_name(3), "Quarterfinal");
    assert_eq!(round_name(4), "Round of 16");

    let b = generate_bracket(&entrants(16), Seeding::Seeded, false, &mut rng()).unwrap();
    let names: Vec<&str> = b.main.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Round of 16", "Quarterfinal", "Semifinal", "Final"]);
    let sizes: Vec<usize> = b.main.rounds.iter().map(|r| r.matches.len()).collect();
    assert_eq!(sizes, vec![8, 4, 2, 1]);
}

#[test]
fn byes_go_to_top_seeds_and_advance() {
    let e = entrants(5);
    let b = generate_bracket(&e, Seeding::Seeded, false, &mut rng()).unwrap();
    assert_eq!(b.main.size, 8);
    let first = &b.main.rounds[0].matches;
    assert_eq!(first.len(), 4);

    assert_eq!((first[0].slot1, first[0].slot2), (Slot::Entrant(e[0]), Slot::Bye));
    assert_eq!(first[0].winner, Some(Side::One));
    assert_eq!((first[1].slot1, first[1].slot2), (Slot::Entrant(e[3]), Slot::Entrant(e[4])));
    assert_eq!(first[1].winner, None);
    assert_eq!(first[2].slot2, Slot::Bye);
    assert_eq!(first[3].slot2, Slot::Bye);

    let semis = &b.main.rounds[1].matches;
    assert_eq!((semis[0].slot1, semis[0].slot2), (Slot::Entrant(e[0]), Slot::Empty));
    assert_eq!((semis[1].slot1, semis[1].slot2), (Slot::Entrant(e[1]), Slot::Entrant(e[2])));
    assert_eq!(b.main.rounds[2].matches[0].slot1, Slot::Empty);
}

#[test]
fn needs_two_entrants() {
    assert_eq!(
        generate_bracket(&entrants(1), Seeding::Seeded, false, &mut rng()).unwrap_err(),
        EngineError::NotEnoughParticipants { required: 2, found: 1 }
    );
    let e = entrants(2);
    assert!(matches!(
        generate_bracket(&[e[0], e[1], e[0]], Seeding::Seeded, false, &mut rng()),
        Err(EngineError::DuplicateParticipant(_))
    ));
}

#[test]
fn winners_advance_to_a_champion() {
    let e = entrants(4);
    let mut b = generate_bracket(&e, Seeding::Seeded, false, &mut rng()).unwrap();
    // Round 1: seed 1 v seed 4, seed 2 v seed 3
    b.record_winner(Draw::Main, 1, 0, Side::One).unwrap();
    b.record_winner(Draw::Main, 1, 1, Side::Two).unwrap();
    let fin = b.get(Draw::Main, 2, 0).unwrap();
    assert_eq!((fin.slot1, fin.slot2), (Slot::Entrant(e[0]), Slot::Entrant(e[2])));
    assert_eq!(b.main.champion(), None);

    b.record_winner(Draw::Main, 2, 0, Side::Two).unwrap();
    assert_eq!(b.main.champion(), Some(e[2]));
    assert_eq!(
        b.record_winner(Draw::Main, 2, 0, Side::One).unwrap_err(),
        EngineError::InvalidBracketSlot { round: 2, position: 0 }
    );
}

#[test]
fn bye_matches_take_no_result() {
    let mut b = generate_bracket(&entrants(3), Seeding::Seeded, false, &mut rng()).unwrap();
    assert_eq!(
        b.record_winner(Draw::Main, 1, 0, Side::One).unwrap_err(),
        EngineError::InvalidBracketSlot { round: 1, position: 0 }
    );
    assert!(b.record_winner(Draw::Consolation, 1, 0, Side::One).is_err());
}

#[test]
fn first_round_losers_fill_the_consolation_draw() {
    let e = entrants(8);
    let mut b = generate_bracket(&e, Seeding::Seeded, true, &mut rng()).unwrap();
    let cons = b.consolation.as_ref().unwrap();
    assert_eq!(cons.size, 4);
    assert_eq!(cons.rounds[0].matches.len(), 2);
    assert_eq!(cons.rounds[0].name, "Semifinal");

    // Main first round in slot order: 1v8, 4v5, 2v7, 3v6; top seeds win
    for position in 0..4 {
        b.record_winner(Draw::Main, 1, position, Side::One).unwrap();
    }
    let c0 = b.get(Draw::Consolation, 1, 0).unwrap();
    let c1 = b.get(Draw::Consolation, 1, 1).unwrap();
    assert_eq!((c0.slot1, c0.slot2), (Slot::Entrant(e[7]), Slot::Entrant(e[5])));
    assert_eq!((c1.slot1, c1.slot2), (Slot::Entrant(e[4]), Slot::Entrant(e[6])));

    b.record_winner(Draw::Consolation, 1, 0, Side::One).unwrap();
    b.record_winner(Draw::Consolation, 1, 1, Side::Two).unwrap();
    b.record_winner(Draw::Consolation, 2, 0, Side::Two).unwrap();
    assert_eq!(b.consolation.as_ref().unwrap().champion(), Some(e[6]));
}

#[test]
fn consolation_only_counts_played_first_round_matches() {
    // 6 entrants in 8 slots: two byes, two played matches
    let b = generate_bracket(&entrants(6), Seeding::Seeded, true, &mut rng()).unwrap();
    let cons = b.consolation.unwrap();
    assert_eq!(cons.size, 2);
    assert_eq!(cons.rounds.len(), 1);
    assert_eq!(cons.rounds[0].name, "Final");

    // 5 entrants leave a single played match: nothing to console
    let b = generate_bracket(&entrants(5), Seeding::Seeded, true, &mut rng()).unwrap();
    assert!(b.consolation.is_none());
}

#[test]
fn random_seeding_places_every_entrant_once() {
    let e = entrants(8);
    let b = generate_bracket(&e, Seeding::Random, false, &mut rng()).unwrap();
    let placed: HashSet<Participant> = b.main.rounds[0]
        .matches
        .iter()
        .flat_map(|m| [m.slot1, m.slot2])
        .filter_map(|s| match s {
            Slot::Entrant(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(placed, e.iter().copied().collect());

    let again = generate_bracket(&e, Seeding::Random, false, &mut rng()).unwrap();
    assert_eq!(b, again);
}
