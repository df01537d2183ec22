//! Draw tie-break memory for a pair of teams.

use serde::{Deserialize, Serialize};

use super::{PairKey, TeamId};

/// Remembers which team of a pair plays first the next time they draw.
///
/// `team1` is always the lower id. `next_to_play` is always one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawTracker {
    pub team1: TeamId,
    pub team2: TeamId,
    pub next_to_play: TeamId,
}

impl DrawTracker {
    /// Tracker for a pair's first draw: the lower id played first, so the
    /// higher id goes first next time.
    pub fn after_first_draw(pair: PairKey) -> Self {
        Self {
            team1: pair.low(),
            team2: pair.high(),
            next_to_play: pair.high(),
        }
    }

    pub fn pair(&self) -> Option<PairKey> {
        PairKey::new(self.team1, self.team2)
    }

    /// Hand the first slot to the other team for the following draw.
    pub fn toggle(&mut self) {
        self.next_to_play = if self.next_to_play == self.team1 {
            self.team2
        } else {
            self.team1
        };
    }

    /// Whether the stored ids form a canonical pair holding `next_to_play`.
    pub fn is_consistent(&self) -> bool {
        self.team1 < self.team2
            && (self.next_to_play == self.team1 || self.next_to_play == self.team2)
    }
}
