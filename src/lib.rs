//! Padel competition engine: library with models and competition logic.

pub mod logic;
pub mod models;

pub use logic::{
    advance_pozo, advance_round, build_playoff, calculate_next_round, close_phase, compute_movements,
    compute_standings, confirm_movements, correct_match_result, generate_bracket, generate_classic4,
    generate_division_matches, generate_group_stage, initial_round, preview_phase, record_match_result,
    start_ranking, Brackets, Draw, MovementPlan, PhaseOutcome,
};
pub use models::{
    Division, EngineError, Entrants, FormatConfig, Match, MatchId, Pair, Participant, Player, PlayerId, Ranking,
    RankingConfig, RankingId, Score, StandingRow,
};
