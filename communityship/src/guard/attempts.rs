use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{board::Coordinate, guard::Rejection};

/// A move attempt that was turned away.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    #[serde(rename = "move")]
    pub coord: Coordinate,
    /// Tag of the [`Rejection`] that stopped the move.
    pub reason: String,
}

impl AttemptRecord {
    /// Record a rejected attempt.
    pub fn new(
        username: impl Into<String>,
        coord: Coordinate,
        rejection: &Rejection,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            username: username.into(),
            coord,
            reason: rejection.tag().to_owned(),
        }
    }
}

/// Bounded log of rejected attempts, oldest first, kept for admin review.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptLog {
    attempts: VecDeque<AttemptRecord>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt, keeping only the most recent `limit`.
    pub fn push(&mut self, record: AttemptRecord, limit: usize) {
        self.attempts.push_back(record);
        while self.attempts.len() > limit {
            self.attempts.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn iter(&self) -> impl '_ + DoubleEndedIterator<Item = &AttemptRecord> {
        self.attempts.iter()
    }

    /// Attempts made by the given player, oldest first.
    pub fn by_player<'a>(&'a self, username: &'a str) -> impl 'a + Iterator<Item = &'a AttemptRecord> {
        self.attempts.iter().filter(move |a| a.username == username)
    }

    /// Number of attempts per reason, most common first. Ties are ordered by reason.
    pub fn counts_by_reason(&self) -> Vec<(&str, usize)> {
        let mut counts = BTreeMap::new();
        for attempt in &self.attempts {
            *counts.entry(attempt.reason.as_str()).or_insert(0) += 1;
        }
        let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(log: &mut AttemptLog, user: &str, rejection: Rejection, limit: usize) {
        let coord = "A1".parse().unwrap();
        log.push(AttemptRecord::new(user, coord, &rejection, Utc::now()), limit);
    }

    #[test]
    fn keeps_most_recent_attempts() {
        let mut log = AttemptLog::new();
        for minutes in 1..=4 {
            rejected(&mut log, "ann", Rejection::RateLimited { minutes }, 3);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.by_player("ann").count(), 3);
        assert_eq!(log.by_player("bob").count(), 0);
    }

    #[test]
    fn counts_reasons() {
        let mut log = AttemptLog::new();
        let cooldown = Rejection::Cooldown {
            hours: 1,
            minutes: 0,
        };
        rejected(&mut log, "ann", cooldown.clone(), 10);
        rejected(&mut log, "bob", cooldown, 10);
        rejected(&mut log, "bob", Rejection::Suspicious { moves: 3 }, 10);
        assert_eq!(
            log.counts_by_reason(),
            vec![("cooldown", 2), ("multi_account", 1)]
        );
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[2]["reason"], "multi_account");
        assert_eq!(json[2]["move"], "A1");
    }
}
