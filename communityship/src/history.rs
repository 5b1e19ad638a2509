//! Bounded log of recent moves.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{board::Coordinate, game::ShotOutcome, ships::ShipId};

/// Whether a logged move hit or missed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShotResult {
    Hit,
    Miss,
}

/// A single logged move.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Login of the player who fired.
    pub username: String,
    /// Cell that was fired at.
    #[serde(rename = "move")]
    pub coord: Coordinate,
    pub result: ShotResult,
    /// Ship that was hit, if any.
    #[serde(default)]
    pub ship: Option<ShipId>,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    /// Build a log entry from the outcome of a shot.
    pub fn new(
        username: impl Into<String>,
        coord: Coordinate,
        outcome: &ShotOutcome,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            coord,
            result: if outcome.is_hit() {
                ShotResult::Hit
            } else {
                ShotResult::Miss
            },
            ship: outcome.ship().map(str::to_owned),
            timestamp,
        }
    }
}

/// Ordered log of moves, oldest first.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveHistory {
    entries: VecDeque<MoveRecord>,
}

impl MoveHistory {
    /// Construct an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a move, evicting the oldest entries so at most `limit` remain.
    pub fn push(&mut self, record: MoveRecord, limit: usize) {
        self.entries.push_back(record);
        while self.entries.len() > limit {
            self.entries.pop_front();
        }
    }

    /// Number of logged moves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no moves are logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every logged move.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate the moves, oldest first.
    pub fn iter(&self) -> impl '_ + DoubleEndedIterator<Item = &MoveRecord> {
        self.entries.iter()
    }

    /// The most recent `n` moves, oldest first.
    pub fn recent(&self, n: usize) -> impl '_ + DoubleEndedIterator<Item = &MoveRecord> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// The most recent `n` moves by the given player, oldest first.
    pub fn recent_by<'a>(&'a self, username: &str, n: usize) -> Vec<&'a MoveRecord> {
        let mut moves: Vec<&MoveRecord> = self
            .entries
            .iter()
            .rev()
            .filter(|m| m.username == username)
            .take(n)
            .collect();
        moves.reverse();
        moves
    }

    /// The most recent move overall.
    pub fn last(&self) -> Option<&MoveRecord> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(user: &str, cell: &str, minutes_ago: i64) -> MoveRecord {
        MoveRecord::new(
            user,
            cell.parse().unwrap(),
            &ShotOutcome::Miss,
            Utc::now() - Duration::minutes(minutes_ago),
        )
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = MoveHistory::new();
        for (i, cell) in ["A1", "A2", "A3", "A4"].iter().enumerate() {
            history.push(record("amy", cell, 10 - i as i64), 3);
        }
        assert_eq!(history.len(), 3);
        let cells: Vec<String> = history.iter().map(|m| m.coord.to_string()).collect();
        assert_eq!(cells, vec!["A2", "A3", "A4"]);
    }

    #[test]
    fn recent_by_filters_and_keeps_order() {
        let mut history = MoveHistory::new();
        history.push(record("amy", "A1", 5), 50);
        history.push(record("bo", "B1", 4), 50);
        history.push(record("amy", "A2", 3), 50);
        history.push(record("amy", "A3", 2), 50);
        let moves = history.recent_by("amy", 2);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].coord.to_string(), "A2");
        assert_eq!(moves[1].coord.to_string(), "A3");
        assert_eq!(history.recent(2).count(), 2);
        assert_eq!(history.recent(9).count(), 4);
    }

    #[test]
    fn json_uses_move_key() {
        let mut history = MoveHistory::new();
        let hit = ShotOutcome::Hit("carrier".into());
        history.push(MoveRecord::new("cy", "C3".parse().unwrap(), &hit, Utc::now()), 50);
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["move"], "C3");
        assert_eq!(json[0]["result"], "Hit");
        assert_eq!(json[0]["ship"], "carrier");
    }
}
