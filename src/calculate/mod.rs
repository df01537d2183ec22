//! Statistics calculation engine.
//!
//! Derives read-only metrics from a session's match log:
//! - Per-team standings (wins, losses, draws, points)
//! - The current winner-stays-on streak
//! - Head-to-head records

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{MatchRecord, Session, TeamId};

/// Points awarded for a win.
pub const POINTS_PER_WIN: u32 = 3;

/// Points awarded for a draw.
pub const POINTS_PER_DRAW: u32 = 1;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStanding {
    pub team: TeamId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub points: u32,
}

impl TeamStanding {
    fn new(team: TeamId) -> Self {
        Self {
            team,
            played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0,
        }
    }

    pub fn win_rate(&self) -> f64 {
        calculate_win_rate(self.wins, self.losses, self.draws)
    }
}

/// Calculate win rate from wins/losses/draws.
pub fn calculate_win_rate(wins: u32, losses: u32, draws: u32) -> f64 {
    let total = wins + losses + draws;
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Standings for every team, best first.
///
/// Ordered by points, then wins, then team number. Teams that have not
/// played yet are included with zeroes.
pub fn standings(session: &Session) -> Vec<TeamStanding> {
    let mut table: HashMap<TeamId, TeamStanding> = session
        .teams()
        .map(|team| (team, TeamStanding::new(team)))
        .collect();

    for record in session.match_history() {
        tally(&mut table, record);
    }

    let mut rows: Vec<_> = table.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(a.team.cmp(&b.team))
    });
    rows
}

fn tally(table: &mut HashMap<TeamId, TeamStanding>, record: &MatchRecord) {
    for team in [record.team1, record.team2] {
        let row = table
            .entry(team)
            .or_insert_with(|| TeamStanding::new(team));
        row.played += 1;

        match record.winner() {
            Some(winner) if winner == team => {
                row.wins += 1;
                row.points += POINTS_PER_WIN;
            }
            Some(_) => row.losses += 1,
            None => {
                row.draws += 1;
                row.points += POINTS_PER_DRAW;
            }
        }
    }
}

/// The team on the current winning run and its length.
///
/// Counts consecutive wins by the winner of the most recent match. Returns
/// `None` if the last match was a draw or nothing has been played.
pub fn current_streak(session: &Session) -> Option<(TeamId, u32)> {
    let history = session.match_history();
    let holder = history.last()?.winner()?;

    let length = history
        .iter()
        .rev()
        .take_while(|record| record.winner() == Some(holder))
        .count() as u32;

    Some((holder, length))
}

/// Head-to-head record between two teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl HeadToHead {
    pub fn total(&self) -> u32 {
        self.wins_a + self.wins_b + self.draws
    }
}

/// Results of all matches between `a` and `b`, from `a`'s point of view.
pub fn head_to_head(session: &Session, a: TeamId, b: TeamId) -> HeadToHead {
    let mut h2h = HeadToHead::default();

    for record in session
        .match_history()
        .iter()
        .filter(|r| r.involves(a) && r.involves(b))
    {
        match record.winner() {
            Some(w) if w == a => h2h.wins_a += 1,
            Some(_) => h2h.wins_b += 1,
            None => h2h.draws += 1,
        }
    }

    h2h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;
    use pretty_assertions::assert_eq;

    fn team(n: u32) -> TeamId {
        TeamId::new(n)
    }

    fn played(results: &[MatchResult]) -> Session {
        let mut session = Session::initialize(4).unwrap();
        for result in results {
            session.draw_next_match().unwrap();
            session.record_result(*result).unwrap();
        }
        session
    }

    #[test]
    fn test_calculate_win_rate() {
        assert!((calculate_win_rate(5, 1, 0) - 0.833).abs() < 0.01);
        assert_eq!(calculate_win_rate(0, 0, 0), 0.0);
        assert_eq!(calculate_win_rate(3, 3, 0), 0.5);
    }

    #[test]
    fn test_standings_empty_history() {
        let session = played(&[]);
        let rows = standings(&session);

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0));
        let order: Vec<u32> = rows.iter().map(|r| r.team.get()).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_standings_after_matches() {
        // [1,2,3,4]: 1 beats 2 -> [1,3,4,2]; 1 beats 3 -> [1,4,2,3];
        // 1 draws 4 -> [2,3,1,4]
        let session = played(&[
            MatchResult::Team1Win,
            MatchResult::Team1Win,
            MatchResult::Draw,
        ]);
        let rows = standings(&session);

        assert_eq!(
            rows[0],
            TeamStanding {
                team: team(1),
                played: 3,
                wins: 2,
                losses: 0,
                draws: 1,
                points: 7,
            }
        );
        assert_eq!(rows[1].team, team(4));
        assert_eq!(rows[1].points, 1);
        assert_eq!(rows[2].team, team(2));
        assert_eq!(rows[2].losses, 1);
        assert_eq!(rows[3].team, team(3));
    }

    #[test]
    fn test_win_rate_on_standing() {
        let session = played(&[MatchResult::Team1Win, MatchResult::Team2Win]);
        let rows = standings(&session);
        let one = rows.iter().find(|r| r.team == team(1)).unwrap();

        assert_eq!(one.played, 2);
        assert_eq!(one.win_rate(), 0.5);
    }

    #[test]
    fn test_current_streak() {
        let session = played(&[MatchResult::Team1Win, MatchResult::Team1Win]);
        assert_eq!(current_streak(&session), Some((team(1), 2)));
    }

    #[test]
    fn test_streak_broken_by_new_winner() {
        // 1 beats 2 -> [1,3,4,2]; 3 beats 1 -> [3,4,2,1]
        let session = played(&[MatchResult::Team1Win, MatchResult::Team2Win]);
        assert_eq!(current_streak(&session), Some((team(3), 1)));
    }

    #[test]
    fn test_streak_none_after_draw() {
        let session = played(&[MatchResult::Team1Win, MatchResult::Draw]);
        assert_eq!(current_streak(&session), None);
        assert_eq!(current_streak(&played(&[])), None);
    }

    #[test]
    fn test_head_to_head() {
        // 1 beats 2 -> [1,3,4,2]; 1 draws 3 -> [4,2,1,3]; 4 beats 2 -> [4,1,3,2];
        // 1 beats 4 -> [1,3,2,4]; 3 beats 1 -> [3,2,4,1]
        let session = played(&[
            MatchResult::Team1Win,
            MatchResult::Draw,
            MatchResult::Team1Win,
            MatchResult::Team2Win,
            MatchResult::Team2Win,
        ]);

        let h2h = head_to_head(&session, team(1), team(3));
        assert_eq!(h2h, HeadToHead { wins_a: 0, wins_b: 1, draws: 1 });
        assert_eq!(h2h.total(), 2);

        let reversed = head_to_head(&session, team(3), team(1));
        assert_eq!(reversed, HeadToHead { wins_a: 1, wins_b: 0, draws: 1 });
    }
}
