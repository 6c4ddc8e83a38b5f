//! Ranking configuration: format, point table, scoring mode, tie-break order.
//!
//! A [`RankingConfig`] is only ever produced by [`RankingConfigBuilder::build`], so the
//! engine never sees a half-filled configuration.

use crate::models::ranking::EngineError;
use serde::{Deserialize, Serialize};

/// Fallback values used whenever the builder is not told otherwise.
pub mod defaults {
    use super::{PointTable, TieBreakCriterion};

    pub const POINTS: PointTable = PointTable {
        win_straight: 3,
        win_split: 2,
        draw: 1,
        loss_split: 1,
        loss_straight: 0,
    };
    pub const PROMOTION_COUNT: usize = 1;
    pub const RELEGATION_COUNT: usize = 1;
    /// Total points of a fixed-points match (Americano / Mexicano).
    pub const FIXED_TOTAL_POINTS: u32 = 24;
    pub const CLASSIC_DIVISION_SIZE: usize = 4;
    pub const TIE_BREAKS: [TieBreakCriterion; 5] = [
        TieBreakCriterion::Points,
        TieBreakCriterion::SetDifference,
        TieBreakCriterion::GameDifference,
        TieBreakCriterion::DirectEncounter,
        TieBreakCriterion::Random,
    ];
}

/// Format tag without its parameters (for errors, logs and API listings).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Classic,
    IndividualLeague,
    PairsLeague,
    Americano,
    Mexicano,
    Pozo,
    Elimination,
    GroupsPlayoff,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FormatKind::Classic => "classic",
            FormatKind::IndividualLeague => "individual league",
            FormatKind::PairsLeague => "pairs league",
            FormatKind::Americano => "americano",
            FormatKind::Mexicano => "mexicano",
            FormatKind::Pozo => "pozo",
            FormatKind::Elimination => "elimination",
            FormatKind::GroupsPlayoff => "groups + playoff",
        };
        write!(f, "{}", name)
    }
}

/// Whether a Pozo ladder rotates individuals or keeps fixed pairs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PozoVariant {
    #[default]
    Individual,
    FixedPairs,
}

/// How entrants are placed into an elimination draw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// Entrant order is seed order; byes go to the top seeds.
    #[default]
    Seeded,
    /// Entrants are shuffled before placement.
    Random,
}

/// Format-specific settings. Each variant carries only what its format needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum FormatConfig {
    Classic,
    IndividualLeague,
    PairsLeague,
    Americano { courts: u32 },
    Mexicano { courts: u32 },
    Pozo { courts: u32, variant: PozoVariant },
    Elimination { seeding: Seeding, consolation: bool },
    GroupsPlayoff { groups: u32, qualifiers_per_group: u32, consolation: bool },
}

impl FormatConfig {
    pub fn kind(&self) -> FormatKind {
        match self {
            FormatConfig::Classic => FormatKind::Classic,
            FormatConfig::IndividualLeague => FormatKind::IndividualLeague,
            FormatConfig::PairsLeague => FormatKind::PairsLeague,
            FormatConfig::Americano { .. } => FormatKind::Americano,
            FormatConfig::Mexicano { .. } => FormatKind::Mexicano,
            FormatConfig::Pozo { .. } => FormatKind::Pozo,
            FormatConfig::Elimination { .. } => FormatKind::Elimination,
            FormatConfig::GroupsPlayoff { .. } => FormatKind::GroupsPlayoff,
        }
    }

    /// True when participants are fixed pairs rather than individuals.
    pub fn uses_pairs(&self) -> bool {
        matches!(
            self,
            FormatConfig::PairsLeague
                | FormatConfig::Pozo {
                    variant: PozoVariant::FixedPairs,
                    ..
                }
                | FormatConfig::Elimination { .. }
                | FormatConfig::GroupsPlayoff { .. }
        )
    }

    pub fn courts(&self) -> Option<u32> {
        match self {
            FormatConfig::Americano { courts }
            | FormatConfig::Mexicano { courts }
            | FormatConfig::Pozo { courts, .. } => Some(*courts),
            _ => None,
        }
    }

    /// Number of participants a division of this format must hold, when the format fixes it.
    /// Counted in players for individual formats and in pairs for pair formats.
    pub fn expected_division_size(&self) -> Option<usize> {
        match self {
            FormatConfig::Classic => Some(defaults::CLASSIC_DIVISION_SIZE),
            FormatConfig::Pozo {
                courts,
                variant: PozoVariant::Individual,
            } => Some(*courts as usize * 4),
            FormatConfig::Pozo {
                courts,
                variant: PozoVariant::FixedPairs,
            } => Some(*courts as usize * 2),
            _ => None,
        }
    }
}

/// How raw scores are entered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ScoringMode {
    #[default]
    Sets,
    FixedPoints { total: u32 },
}

/// Standings points per outcome, seen from one pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PointTable {
    /// Win without dropping a set (2-0).
    pub win_straight: i32,
    /// Win after dropping a set (2-1).
    pub win_split: i32,
    pub draw: i32,
    /// Loss after taking a set (1-2).
    pub loss_split: i32,
    /// Loss without taking a set (0-2).
    pub loss_straight: i32,
}

impl Default for PointTable {
    fn default() -> Self {
        defaults::POINTS
    }
}

/// One rule of the standings tie-break cascade.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakCriterion {
    Points,
    SetDifference,
    GameDifference,
    MatchesWon,
    SetsWon,
    GamesWon,
    WinRate,
    /// Head-to-head result; only applies when exactly two rows are still tied.
    DirectEncounter,
    /// Coin flip of last resort.
    Random,
}

/// Ordered, never empty list of tie-break criteria.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TieBreakCriterion>", into = "Vec<TieBreakCriterion>")]
pub struct TieBreakOrder(Vec<TieBreakCriterion>);

impl Default for TieBreakOrder {
    fn default() -> Self {
        TieBreakOrder(defaults::TIE_BREAKS.to_vec())
    }
}

impl TryFrom<Vec<TieBreakCriterion>> for TieBreakOrder {
    type Error = EngineError;

    fn try_from(criteria: Vec<TieBreakCriterion>) -> Result<Self, Self::Error> {
        if criteria.is_empty() {
            return Err(EngineError::NoTieBreakCriteria);
        }
        let mut order = TieBreakOrder(Vec::with_capacity(criteria.len()));
        for c in criteria {
            order.push(c)?;
        }
        Ok(order)
    }
}

impl From<TieBreakOrder> for Vec<TieBreakCriterion> {
    fn from(order: TieBreakOrder) -> Self {
        order.0
    }
}

impl TieBreakOrder {
    pub fn criteria(&self) -> &[TieBreakCriterion] {
        &self.0
    }

    /// Append a criterion at the lowest priority.
    pub fn push(&mut self, criterion: TieBreakCriterion) -> Result<(), EngineError> {
        self.insert(self.0.len(), criterion)
    }

    /// Insert a criterion at `index` (0 = highest priority).
    pub fn insert(&mut self, index: usize, criterion: TieBreakCriterion) -> Result<(), EngineError> {
        if self.0.contains(&criterion) {
            return Err(EngineError::DuplicateTieBreak(criterion));
        }
        self.0.insert(index.min(self.0.len()), criterion);
        Ok(())
    }

    /// Remove a criterion. The last remaining criterion cannot be removed.
    pub fn remove(&mut self, criterion: TieBreakCriterion) -> Result<(), EngineError> {
        let idx = self
            .position(criterion)
            .ok_or(EngineError::UnknownTieBreak(criterion))?;
        if self.0.len() == 1 {
            return Err(EngineError::NoTieBreakCriteria);
        }
        self.0.remove(idx);
        Ok(())
    }

    /// Raise a criterion one step in priority. No-op when already first.
    pub fn move_up(&mut self, criterion: TieBreakCriterion) -> Result<(), EngineError> {
        let idx = self
            .position(criterion)
            .ok_or(EngineError::UnknownTieBreak(criterion))?;
        if idx > 0 {
            self.0.swap(idx, idx - 1);
        }
        Ok(())
    }

    /// Lower a criterion one step in priority. No-op when already last.
    pub fn move_down(&mut self, criterion: TieBreakCriterion) -> Result<(), EngineError> {
        let idx = self
            .position(criterion)
            .ok_or(EngineError::UnknownTieBreak(criterion))?;
        if idx + 1 < self.0.len() {
            self.0.swap(idx, idx + 1);
        }
        Ok(())
    }

    fn position(&self, criterion: TieBreakCriterion) -> Option<usize> {
        self.0.iter().position(|c| *c == criterion)
    }
}

/// What to do when a phase transition leaves a division at the wrong size.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Surface a warning and let the administrator confirm anyway.
    #[default]
    Warn,
    /// Refuse to confirm the transition.
    Reject,
}

/// Finalized, validated configuration of a ranking. Deserializing goes through
/// [`RankingConfigBuilder::build`] as well.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RankingConfigBuilder")]
pub struct RankingConfig {
    pub format: FormatConfig,
    pub points: PointTable,
    pub scoring: ScoringMode,
    pub promotion_count: usize,
    pub relegation_count: usize,
    pub tie_breaks: TieBreakOrder,
    pub size_policy: SizePolicy,
}

impl RankingConfig {
    pub fn builder() -> RankingConfigBuilder {
        RankingConfigBuilder::default()
    }
}

impl TryFrom<RankingConfigBuilder> for RankingConfig {
    type Error = EngineError;

    fn try_from(builder: RankingConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// Step-by-step construction of a [`RankingConfig`] (setup wizard style).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfigBuilder {
    format: Option<FormatConfig>,
    points: Option<PointTable>,
    scoring: Option<ScoringMode>,
    promotion_count: Option<usize>,
    relegation_count: Option<usize>,
    tie_breaks: Option<Vec<TieBreakCriterion>>,
    size_policy: Option<SizePolicy>,
}

impl RankingConfigBuilder {
    pub fn format(mut self, format: FormatConfig) -> Self {
        self.format = Some(format);
        self
    }

    pub fn points(mut self, points: PointTable) -> Self {
        self.points = Some(points);
        self
    }

    pub fn scoring(mut self, scoring: ScoringMode) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn promotion_count(mut self, count: usize) -> Self {
        self.promotion_count = Some(count);
        self
    }

    pub fn relegation_count(mut self, count: usize) -> Self {
        self.relegation_count = Some(count);
        self
    }

    pub fn tie_breaks(mut self, criteria: Vec<TieBreakCriterion>) -> Self {
        self.tie_breaks = Some(criteria);
        self
    }

    pub fn size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = Some(policy);
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// Court formats need at least one court; social formats default to fixed-points
    /// scoring, everything else to sets.
    pub fn build(self) -> Result<RankingConfig, EngineError> {
        let format = self.format.ok_or(EngineError::MissingConfig("format"))?;

        if let Some(courts) = format.courts() {
            if courts == 0 {
                return Err(EngineError::MissingConfig("courts"));
            }
        }
        if let FormatConfig::GroupsPlayoff {
            groups,
            qualifiers_per_group,
            ..
        } = format
        {
            if groups == 0 || qualifiers_per_group == 0 {
                return Err(EngineError::MissingConfig("groups"));
            }
        }

        let scoring = self.scoring.unwrap_or(match format {
            FormatConfig::Americano { .. } | FormatConfig::Mexicano { .. } => ScoringMode::FixedPoints {
                total: defaults::FIXED_TOTAL_POINTS,
            },
            _ => ScoringMode::Sets,
        });
        if scoring == (ScoringMode::FixedPoints { total: 0 }) {
            return Err(EngineError::MissingConfig("fixed total points"));
        }

        let tie_breaks = match self.tie_breaks {
            Some(criteria) => TieBreakOrder::try_from(criteria)?,
            None => TieBreakOrder::default(),
        };

        Ok(RankingConfig {
            format,
            points: self.points.unwrap_or(defaults::POINTS),
            scoring,
            promotion_count: self.promotion_count.unwrap_or(defaults::PROMOTION_COUNT),
            relegation_count: self.relegation_count.unwrap_or(defaults::RELEGATION_COUNT),
            tie_breaks,
            size_policy: self.size_policy.unwrap_or_default(),
        })
    }
}
