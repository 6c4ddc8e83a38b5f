//! Competition logic: schedules, ladder rotation, standings, phase transitions and brackets.

mod bracket;
mod generator;
mod groups;
mod pozo;
mod scoring;
mod setup;
mod standings;
mod transition;

pub use bracket::{
    bracket_size, generate_bracket, round_name, seed_order, Bracket, BracketMatch, BracketRound, Brackets, Draw,
    Slot,
};
pub use generator::{
    generate_americano, generate_classic4, generate_individual_league, generate_mexicano_round,
    generate_pairs_league,
};
pub use groups::{build_playoff, generate_group_stage, playoff_seeds};
pub use pozo::{advance_pozo, calculate_next_round, initial_round, round_state, RoundState};
pub use scoring::{correct_result, record_result, resolve, Outcome, Resolution};
pub use setup::{
    advance_round, correct_match_result, generate_division_matches, mark_match_not_played, record_match_result,
    start_ranking,
};
pub use standings::{compute_standings, player_lifetime_stats};
pub use transition::{close_phase, compute_movements, confirm_movements, preview_phase, MovementPlan, PhaseOutcome};
