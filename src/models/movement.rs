//! Promotion / relegation movements between divisions at a phase boundary.

use crate::models::game::Participant;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Up,
    Down,
    Stay,
}

/// Computed destination of one participant, optionally overridden by an administrator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub participant: Participant,
    pub origin: u32,
    /// Position in the origin division's final standings.
    pub origin_position: usize,
    pub kind: MovementKind,
    /// Destination computed from the standings.
    pub destination: u32,
    /// Manual destination; wins over `destination` when set.
    pub manual_override: Option<u32>,
}

impl Movement {
    pub fn effective_destination(&self) -> u32 {
        self.manual_override.unwrap_or(self.destination)
    }

    pub fn is_overridden(&self) -> bool {
        self.manual_override.is_some()
    }
}

/// A destination division whose size does not match what the format requires.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SizeWarning {
    pub division: u32,
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for SizeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Division {} would have {} participants (expected {})",
            self.division, self.actual, self.expected
        )
    }
}
