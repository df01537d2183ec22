//! Rotation scheduler.
//!
//! Winner-stays-on turn taking for a shared playing slot:
//! - the two teams at the head of the waiting queue play next
//! - a winner goes back to the front, a loser to the back
//! - after a draw both go to the back, in an order that alternates across
//!   repeated draws between the same pair
//!
//! Every operation checks its preconditions before touching the session, so
//! a failed call leaves the session exactly as it was.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
    CurrentMatch, DrawTracker, MatchRecord, MatchResult, PairKey, Session, TeamId, MAX_TEAMS,
    MIN_TEAMS,
};

/// Errors returned by scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    /// Bad team count at initialization.
    #[error("{0}")]
    Validation(String),

    /// Fewer than two teams are waiting, or a match is still in progress.
    #[error("No match can be drawn: {available} teams waiting, 2 needed with no match in progress")]
    InsufficientTeams { available: usize },

    /// A result was recorded with no match in progress.
    #[error("No match in progress")]
    NoActiveMatch,

    /// The session breaks one of its structural invariants.
    #[error("Session invariant violated: {0}")]
    InvariantViolation(String),
}

impl RotationError {
    /// Whether the error is something the user can correct, as opposed to a
    /// caller contract violation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RotationError::Validation(_) | RotationError::InsufficientTeams { .. }
        )
    }
}

impl Session {
    /// Create a fresh session with teams `1..=total_teams` queued in order.
    ///
    /// Takes the raw number so that any user input is validated here.
    pub fn initialize(total_teams: i64) -> Result<Session, RotationError> {
        if total_teams < MIN_TEAMS as i64 || total_teams > MAX_TEAMS as i64 {
            return Err(RotationError::Validation(format!(
                "Number of teams must be between {} and {}",
                MIN_TEAMS, MAX_TEAMS
            )));
        }
        let total_teams = total_teams as u32;

        info!("Initializing rotation with {} teams", total_teams);

        Ok(Session {
            total_teams,
            current_match: None,
            waiting_queue: (1..=total_teams).map(TeamId::new).collect(),
            match_history: Vec::new(),
            match_counter: 0,
            draw_trackers: HashMap::new(),
            started_at: Some(Utc::now()),
        })
    }

    /// Take the two longest-waiting teams off the queue and start their match.
    ///
    /// Only allowed with no match in progress; the result must be recorded
    /// first.
    pub fn draw_next_match(&mut self) -> Result<CurrentMatch, RotationError> {
        if self.current_match.is_some() || self.waiting_queue.len() < 2 {
            return Err(RotationError::InsufficientTeams {
                available: self.waiting_queue.len(),
            });
        }

        let team1 = self.waiting_queue[0];
        let team2 = self.waiting_queue[1];
        self.waiting_queue.drain(..2);

        let pairing = CurrentMatch { team1, team2 };
        self.current_match = Some(pairing);

        debug!("Drew match {} vs {}", team1, team2);
        Ok(pairing)
    }

    /// Close the current match with `result` and requeue both teams.
    pub fn record_result(&mut self, result: MatchResult) -> Result<&MatchRecord, RotationError> {
        let current = self.current_match.ok_or(RotationError::NoActiveMatch)?;
        let pair = PairKey::new(current.team1, current.team2).ok_or_else(|| {
            RotationError::InvariantViolation(format!(
                "team {} is paired with itself",
                current.team1
            ))
        })?;

        match result {
            MatchResult::Team1Win => {
                self.waiting_queue.push_front(current.team1);
                self.waiting_queue.push_back(current.team2);
            }
            MatchResult::Team2Win => {
                self.waiting_queue.push_front(current.team2);
                self.waiting_queue.push_back(current.team1);
            }
            MatchResult::Draw => {
                let (first, second) = self.draw_order(pair);
                self.waiting_queue.push_back(first);
                self.waiting_queue.push_back(second);
            }
        }

        self.match_counter += 1;
        self.match_history.push(MatchRecord {
            match_number: self.match_counter,
            team1: current.team1,
            team2: current.team2,
            result,
        });
        self.current_match = None;

        info!(
            "Match {}: {} vs {} -> {}",
            self.match_counter, current.team1, current.team2, result
        );

        Ok(&self.match_history[self.match_history.len() - 1])
    }

    /// Decide who of a drawn pair queues first, and advance the pair's tracker.
    fn draw_order(&mut self, pair: PairKey) -> (TeamId, TeamId) {
        match self.draw_trackers.get_mut(&pair) {
            Some(tracker) => {
                let first = tracker.next_to_play;
                tracker.toggle();
                debug!(
                    "Repeat draw {}: {} plays first, {} next time",
                    pair, first, tracker.next_to_play
                );
                (first, pair.other(first).unwrap_or(pair.high()))
            }
            None => {
                let tracker = DrawTracker::after_first_draw(pair);
                self.draw_trackers.insert(pair, tracker);
                debug!(
                    "First draw {}: {} plays first, {} next time",
                    pair,
                    pair.low(),
                    tracker.next_to_play
                );
                (pair.low(), pair.high())
            }
        }
    }

    /// Verify the structural invariants of the session.
    pub fn check_invariants(&self) -> Result<(), RotationError> {
        let violation = |msg: String| Err(RotationError::InvariantViolation(msg));

        if !(MIN_TEAMS..=MAX_TEAMS).contains(&self.total_teams) {
            return violation(format!("total_teams {} out of range", self.total_teams));
        }

        let in_range = |t: &TeamId| (1..=self.total_teams).contains(&t.get());
        let mut seen = HashSet::new();

        if let Some(current) = &self.current_match {
            if current.team1 == current.team2 {
                return violation(format!("team {} is paired with itself", current.team1));
            }
            seen.insert(current.team1);
            seen.insert(current.team2);
        }

        for team in &self.waiting_queue {
            if !in_range(team) {
                return violation(format!("unknown team {} in queue", team));
            }
            if !seen.insert(*team) {
                return violation(format!("team {} appears more than once", team));
            }
        }

        if seen.len() != self.total_teams as usize || !seen.iter().all(in_range) {
            return violation(format!(
                "queue and current match cover {} of {} teams",
                seen.iter().filter(|t| in_range(*t)).count(),
                self.total_teams
            ));
        }

        if self.match_history.len() != self.match_counter as usize {
            return violation(format!(
                "history holds {} matches but counter is {}",
                self.match_history.len(),
                self.match_counter
            ));
        }

        for (i, record) in self.match_history.iter().enumerate() {
            if record.match_number as usize != i + 1 {
                return violation(format!(
                    "match at position {} is numbered {}",
                    i + 1,
                    record.match_number
                ));
            }
        }

        for (key, tracker) in &self.draw_trackers {
            if !tracker.is_consistent() || tracker.pair() != Some(*key) {
                return violation(format!("draw tracker for {} is inconsistent", key));
            }
            if !in_range(&tracker.team1) || !in_range(&tracker.team2) {
                return violation(format!("draw tracker for {} names an unknown team", key));
            }
        }

        Ok(())
    }
}

/// Pure form of [`Session::draw_next_match`]: returns the next session value.
pub fn draw_next_match(session: &Session) -> Result<Session, RotationError> {
    let mut next = session.clone();
    next.draw_next_match()?;
    Ok(next)
}

/// Pure form of [`Session::record_result`]: returns the next session value.
pub fn record_result(session: &Session, result: MatchResult) -> Result<Session, RotationError> {
    let mut next = session.clone();
    next.record_result(result)?;
    Ok(next)
}

/// Owner of the (possibly absent) session.
///
/// `None` is the empty state: nothing initialized yet, or reset.
#[derive(Debug, Clone, Default)]
pub struct RotationScheduler {
    session: Option<Session>,
}

impl RotationScheduler {
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Resume from a restored session, or start empty.
    pub fn from_session(session: Option<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn into_session(self) -> Option<Session> {
        self.session
    }

    /// Start a new session, discarding any previous one.
    pub fn initialize(&mut self, total_teams: i64) -> Result<&Session, RotationError> {
        let session = Session::initialize(total_teams)?;
        if self.session.is_some() {
            debug!("Discarding previous session");
        }
        Ok(&*self.session.insert(session))
    }

    pub fn draw_next_match(&mut self) -> Result<CurrentMatch, RotationError> {
        match self.session.as_mut() {
            Some(session) => session.draw_next_match(),
            None => Err(RotationError::InsufficientTeams { available: 0 }),
        }
    }

    pub fn record_result(&mut self, result: MatchResult) -> Result<MatchRecord, RotationError> {
        match self.session.as_mut() {
            Some(session) => session.record_result(result).cloned(),
            None => Err(RotationError::NoActiveMatch),
        }
    }

    /// Discard all state. Idempotent.
    pub fn reset(&mut self) {
        if self.session.take().is_some() {
            info!("Session reset");
        }
    }
}
