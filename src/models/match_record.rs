//! Match model: the pairing in progress and completed match records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::TeamId;

/// Outcome of a match, relative to the pairing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    Team1Win,
    Team2Win,
    Draw,
}

impl MatchResult {
    pub fn is_draw(&self) -> bool {
        matches!(self, MatchResult::Draw)
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Team1Win => write!(f, "team1_win"),
            MatchResult::Team2Win => write!(f, "team2_win"),
            MatchResult::Draw => write!(f, "draw"),
        }
    }
}

/// Error returned when a result string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown match result '{0}' (expected team1, team2 or draw)")]
pub struct ParseMatchResultError(pub String);

impl FromStr for MatchResult {
    type Err = ParseMatchResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team1" | "team1_win" | "1" => Ok(MatchResult::Team1Win),
            "team2" | "team2_win" | "2" => Ok(MatchResult::Team2Win),
            "draw" | "d" => Ok(MatchResult::Draw),
            _ => Err(ParseMatchResultError(s.to_string())),
        }
    }
}

/// The pairing currently on the playing slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMatch {
    pub team1: TeamId,
    pub team2: TeamId,
}

impl CurrentMatch {
    pub fn involves(&self, team: TeamId) -> bool {
        self.team1 == team || self.team2 == team
    }
}

/// A completed match. Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// 1-based position in the history
    pub match_number: u32,

    /// Team that was first in the pairing
    pub team1: TeamId,

    /// Team that was second in the pairing
    pub team2: TeamId,

    /// Outcome, relative to team1/team2
    pub result: MatchResult,
}

impl MatchRecord {
    /// Winning team, `None` on a draw.
    pub fn winner(&self) -> Option<TeamId> {
        match self.result {
            MatchResult::Team1Win => Some(self.team1),
            MatchResult::Team2Win => Some(self.team2),
            MatchResult::Draw => None,
        }
    }

    /// Losing team, `None` on a draw.
    pub fn loser(&self) -> Option<TeamId> {
        match self.result {
            MatchResult::Team1Win => Some(self.team2),
            MatchResult::Team2Win => Some(self.team1),
            MatchResult::Draw => None,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team1 == team || self.team2 == team
    }
}
