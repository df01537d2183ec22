//! Team identifiers and canonical team pairs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A team number, assigned once at initialization (`1..=total_teams`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(u32);

impl TeamId {
    /// Create a TeamId from its number.
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Get the team number.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

impl From<u32> for TeamId {
    fn from(n: u32) -> Self {
        Self(n)
    }
}

/// An unordered pair of distinct teams, stored lower id first.
///
/// Used as the lookup key for draw trackers so that `{3, 1}` and `{1, 3}`
/// resolve to the same entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: TeamId,
    high: TeamId,
}

impl PairKey {
    /// Canonicalize two teams into a pair. Returns `None` if they are the same team.
    pub fn new(a: TeamId, b: TeamId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> TeamId {
        self.low
    }

    pub fn high(&self) -> TeamId {
        self.high
    }

    /// Whether the team is one of the pair.
    pub fn contains(&self, team: TeamId) -> bool {
        self.low == team || self.high == team
    }

    /// The opposite member of the pair, or `None` if `team` is not in it.
    pub fn other(&self, team: TeamId) -> Option<TeamId> {
        if team == self.low {
            Some(self.high)
        } else if team == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}
