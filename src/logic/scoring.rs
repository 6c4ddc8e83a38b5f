//! Scoring resolver: raw score → outcome, set/game counts and standings points.

use crate::models::{EngineError, Match, PointTable, RankingConfig, Score, ScoringMode, Side};
use serde::{Deserialize, Serialize};

/// Outcome seen from pair 1.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

/// Everything derived from one raw score. Tuples are (pair 1, pair 2).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub sets: (u32, u32),
    pub games: (u32, u32),
    pub points: (i32, i32),
}

impl Resolution {
    pub fn winner(&self) -> Option<Side> {
        match self.outcome {
            Outcome::Win => Some(Side::One),
            Outcome::Loss => Some(Side::Two),
            Outcome::Draw => None,
        }
    }
}

/// Resolve a raw score under the given scoring mode and point table.
pub fn resolve(score: &Score, mode: ScoringMode, table: &PointTable) -> Result<Resolution, EngineError> {
    match (score, mode) {
        (Score::Sets { sets }, ScoringMode::Sets) => {
            if sets.is_empty() {
                return Err(EngineError::InvalidScore("no sets played".into()));
            }
            let mut won = (0u32, 0u32);
            let mut games = (0u32, 0u32);
            for (i, set) in sets.iter().enumerate() {
                if set.pair1 == set.pair2 {
                    return Err(EngineError::InvalidScore(format!("set {} is tied", i + 1)));
                }
                if set.pair1 > set.pair2 {
                    won.0 += 1;
                } else {
                    won.1 += 1;
                }
                games.0 += set.pair1;
                games.1 += set.pair2;
            }
            let (outcome, points) = if won.0 > won.1 {
                let (w, l) = set_points(table, won.1);
                (Outcome::Win, (w, l))
            } else if won.1 > won.0 {
                let (w, l) = set_points(table, won.0);
                (Outcome::Loss, (l, w))
            } else {
                (Outcome::Draw, (table.draw, table.draw))
            };
            Ok(Resolution {
                outcome,
                sets: won,
                games,
                points,
            })
        }
        (Score::Points { pair1, pair2 }, ScoringMode::FixedPoints { total }) => {
            if pair1.checked_add(*pair2).map_or(true, |sum| sum > total) {
                return Err(EngineError::InvalidScore(format!(
                    "{} + {} points exceed the match total of {}",
                    pair1, pair2, total
                )));
            }
            let (outcome, sets) = match pair1.cmp(pair2) {
                std::cmp::Ordering::Greater => (Outcome::Win, (1, 0)),
                std::cmp::Ordering::Less => (Outcome::Loss, (0, 1)),
                std::cmp::Ordering::Equal => (Outcome::Draw, (0, 0)),
            };
            Ok(Resolution {
                outcome,
                sets,
                games: (*pair1, *pair2),
                points: (*pair1 as i32, *pair2 as i32),
            })
        }
        (Score::Sets { .. }, ScoringMode::FixedPoints { .. }) => Err(EngineError::InvalidScore(
            "set scores given to a fixed-points match".into(),
        )),
        (Score::Points { .. }, ScoringMode::Sets) => Err(EngineError::InvalidScore(
            "point totals given to a sets match".into(),
        )),
    }
}

/// (winner points, loser points) depending on how many sets the loser took.
fn set_points(table: &PointTable, loser_sets: u32) -> (i32, i32) {
    if loser_sets == 0 {
        (table.win_straight, table.loss_straight)
    } else {
        (table.win_split, table.loss_split)
    }
}

/// Record the result of a pending match.
pub fn record_result(m: &mut Match, score: Score, config: &RankingConfig) -> Result<Resolution, EngineError> {
    let resolution = resolve(&score, config.scoring, &config.points)?;
    m.apply_result(score, resolution.points, resolution.winner())?;
    log::debug!("Match {} finished: {:?}", m.id, resolution);
    Ok(resolution)
}

/// Explicitly correct the result of a finished match.
pub fn correct_result(m: &mut Match, score: Score, config: &RankingConfig) -> Result<Resolution, EngineError> {
    let resolution = resolve(&score, config.scoring, &config.points)?;
    m.apply_correction(score, resolution.points, resolution.winner())?;
    log::info!("Match {} corrected ({} correction(s))", m.id, m.corrections);
    Ok(resolution)
}
