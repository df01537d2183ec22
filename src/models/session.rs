//! Session: the complete rotation state for one run.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CurrentMatch, DrawTracker, MatchRecord, PairKey, TeamId};

/// Smallest number of teams a session can rotate.
pub const MIN_TEAMS: u32 = 3;

/// Largest number of teams a session can rotate.
pub const MAX_TEAMS: u32 = 20;

/// Root aggregate of the rotation engine.
///
/// Mutated only through the scheduler operations; read freely by
/// presentation and persistence code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) total_teams: u32,

    pub(crate) current_match: Option<CurrentMatch>,

    /// Teams not currently playing; head plays next
    pub(crate) waiting_queue: VecDeque<TeamId>,

    pub(crate) match_history: Vec<MatchRecord>,

    pub(crate) match_counter: u32,

    /// Keyed by canonical pair, persisted as a list
    #[serde(default, with = "tracker_list")]
    pub(crate) draw_trackers: HashMap<PairKey, DrawTracker>,

    /// When the session was initialized (display only)
    #[serde(default)]
    pub(crate) started_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Number of teams in the rotation.
    pub fn total_teams(&self) -> u32 {
        self.total_teams
    }

    /// The match being played, if any.
    pub fn current_match(&self) -> Option<&CurrentMatch> {
        self.current_match.as_ref()
    }

    /// Teams waiting to play, head first.
    pub fn waiting_queue(&self) -> &VecDeque<TeamId> {
        &self.waiting_queue
    }

    /// Completed matches, oldest first.
    pub fn match_history(&self) -> &[MatchRecord] {
        &self.match_history
    }

    /// Number of matches completed so far.
    pub fn match_counter(&self) -> u32 {
        self.match_counter
    }

    /// When the session was initialized.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// All team ids of the session, ascending.
    pub fn teams(&self) -> impl Iterator<Item = TeamId> {
        (1..=self.total_teams).map(TeamId::new)
    }

    /// The two teams that would be drawn next, without drawing them.
    pub fn next_up(&self) -> Option<(TeamId, TeamId)> {
        if self.current_match.is_some() {
            return None;
        }
        match (self.waiting_queue.front(), self.waiting_queue.get(1)) {
            (Some(&a), Some(&b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Tie-break tracker for a pair, in either order.
    pub fn draw_tracker(&self, a: TeamId, b: TeamId) -> Option<&DrawTracker> {
        PairKey::new(a, b).and_then(|key| self.draw_trackers.get(&key))
    }

    /// All draw trackers, ordered by pair.
    pub fn draw_trackers(&self) -> Vec<&DrawTracker> {
        let mut trackers: Vec<_> = self.draw_trackers.iter().collect();
        trackers.sort_by_key(|(key, _)| **key);
        trackers.into_iter().map(|(_, t)| t).collect()
    }

    /// Whether a match is currently being played.
    pub fn has_active_match(&self) -> bool {
        self.current_match.is_some()
    }
}

/// Serde adapter storing the tracker map as a plain list of trackers.
mod tracker_list {
    use std::collections::HashMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::models::{DrawTracker, PairKey};

    pub fn serialize<S>(map: &HashMap<PairKey, DrawTracker>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by_key(|(key, _)| **key);
        serializer.collect_seq(entries.into_iter().map(|(_, tracker)| tracker))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<PairKey, DrawTracker>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<DrawTracker>::deserialize(deserializer)?;
        let mut map = HashMap::with_capacity(list.len());

        for tracker in list {
            let key = tracker.pair().ok_or_else(|| {
                D::Error::custom(format!(
                    "draw tracker pairs team {} with itself",
                    tracker.team1
                ))
            })?;
            // First entry for a pair wins
            map.entry(key).or_insert(tracker);
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchResult;
    use pretty_assertions::assert_eq;

    fn team(n: u32) -> TeamId {
        TeamId::new(n)
    }

    fn sample_session() -> Session {
        let mut draw_trackers = HashMap::new();
        let key = PairKey::new(team(1), team(3)).unwrap();
        draw_trackers.insert(key, DrawTracker::after_first_draw(key));

        Session {
            total_teams: 4,
            current_match: None,
            waiting_queue: VecDeque::from(vec![team(2), team(4), team(1), team(3)]),
            match_history: vec![MatchRecord {
                match_number: 1,
                team1: team(3),
                team2: team(1),
                result: MatchResult::Draw,
            }],
            match_counter: 1,
            draw_trackers,
            started_at: None,
        }
    }

    #[test]
    fn test_accessors() {
        let session = sample_session();

        assert_eq!(session.total_teams(), 4);
        assert_eq!(session.current_match(), None);
        assert!(!session.has_active_match());
        assert_eq!(
            session.waiting_queue().iter().copied().collect::<Vec<_>>(),
            vec![team(2), team(4), team(1), team(3)]
        );
        assert_eq!(session.match_history().len(), 1);
        assert_eq!(session.match_counter(), 1);
        assert_eq!(session.started_at(), None);
    }

    #[test]
    fn test_next_up() {
        let session = sample_session();
        assert_eq!(session.next_up(), Some((team(2), team(4))));
    }

    #[test]
    fn test_next_up_none_during_match() {
        let mut session = sample_session();
        session.current_match = Some(CurrentMatch {
            team1: team(2),
            team2: team(4),
        });
        session.waiting_queue = VecDeque::from(vec![team(1), team(3)]);

        assert_eq!(session.next_up(), None);
    }

    #[test]
    fn test_draw_tracker_lookup_either_order() {
        let session = sample_session();

        assert!(session.draw_tracker(team(1), team(3)).is_some());
        assert!(session.draw_tracker(team(3), team(1)).is_some());
        assert!(session.draw_tracker(team(1), team(2)).is_none());
        assert!(session.draw_tracker(team(1), team(1)).is_none());
    }

    #[test]
    fn test_teams_ascending() {
        let session = sample_session();
        let teams: Vec<u32> = session.teams().map(|t| t.get()).collect();
        assert_eq!(teams, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_session_serialization() {
        let session = sample_session();
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, session);
    }

    #[test]
    fn test_draw_trackers_serialized_as_list() {
        let session = sample_session();
        let value = serde_json::to_value(&session).unwrap();

        let trackers = value["draw_trackers"].as_array().unwrap();
        assert_eq!(trackers.len(), 1);
        assert_eq!(trackers[0]["nextToPlay"], 3);
    }

    #[test]
    fn test_missing_draw_trackers_treated_as_empty() {
        let json = r#"{
            "total_teams": 3,
            "current_match": null,
            "waiting_queue": [1, 2, 3],
            "match_history": [],
            "match_counter": 0
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.draw_trackers.is_empty());
        assert!(session.started_at.is_none());
    }

    #[test]
    fn test_duplicate_trackers_first_wins() {
        let json = r#"{
            "total_teams": 3,
            "current_match": null,
            "waiting_queue": [1, 2, 3],
            "match_history": [],
            "match_counter": 0,
            "draw_trackers": [
                {"team1": 1, "team2": 2, "nextToPlay": 2},
                {"team1": 1, "team2": 2, "nextToPlay": 1}
            ]
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.draw_trackers.len(), 1);
        assert_eq!(
            session.draw_tracker(team(1), team(2)).unwrap().next_to_play,
            team(2)
        );
    }

    #[test]
    fn test_self_paired_tracker_rejected() {
        let json = r#"{
            "total_teams": 3,
            "current_match": null,
            "waiting_queue": [1, 2, 3],
            "match_history": [],
            "match_counter": 0,
            "draw_trackers": [{"team1": 2, "team2": 2, "nextToPlay": 2}]
        }"#;

        assert!(serde_json::from_str::<Session>(json).is_err());
    }
}
