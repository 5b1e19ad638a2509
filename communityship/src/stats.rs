//! Player statistics for the current round and across all rounds.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::ShotOutcome;

pub use self::achievements::{check_achievements, Achievement, Badges, PlayerBadges, UnknownBadge};

mod achievements;

/// Session leaderboard, keyed by player login.
pub type Leaderboard = BTreeMap<String, PlayerRecord>;

/// All-time leaderboard, keyed by player login.
pub type AllTimeLeaderboard = BTreeMap<String, AllTimeRecord>;

/// Badges for every player, keyed by player login.
pub type AchievementBook = BTreeMap<String, PlayerBadges>;

/// Compute `hits / (hits + misses)` rounded to two decimals. Zero when no moves were made.
pub fn accuracy(hits: u32, misses: u32) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        (f64::from(hits) / f64::from(total) * 100.0).round() / 100.0
    }
}

/// A player's statistics for the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Login of the player.
    pub username: String,
    #[serde(default)]
    pub hits: u32,
    #[serde(default)]
    pub misses: u32,
    /// Consecutive hits, reset by a miss.
    #[serde(default)]
    pub streak: u32,
    /// Hit ratio rounded to two decimals.
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub ships_sunk: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub games_played: u32,
    /// When the player last fired a shot.
    #[serde(default)]
    pub last_move: Option<DateTime<Utc>>,
}

impl PlayerRecord {
    /// Construct an empty record for the given player.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hits: 0,
            misses: 0,
            streak: 0,
            accuracy: 0.0,
            ships_sunk: 0,
            games_won: 0,
            games_played: 0,
            last_move: None,
        }
    }

    /// Number of shots fired this round.
    pub fn total_moves(&self) -> u32 {
        self.hits + self.misses
    }

    /// Apply the outcome of a shot fired at `now`.
    pub fn apply_shot(&mut self, outcome: &ShotOutcome, now: DateTime<Utc>) {
        if outcome.is_hit() {
            self.hits += 1;
            self.streak += 1;
        } else {
            self.misses += 1;
            self.streak = 0;
        }
        if outcome.sunk() {
            self.ships_sunk += 1;
        }
        if outcome.won() {
            self.games_won += 1;
        }
        self.accuracy = accuracy(self.hits, self.misses);
        self.last_move = Some(now);
    }
}

/// A player's lifetime statistics, kept across rounds.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AllTimeRecord {
    /// Login of the player.
    pub username: String,
    #[serde(default)]
    pub total_hits: u32,
    #[serde(default)]
    pub total_misses: u32,
    #[serde(default)]
    pub ships_sunk: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub games_played: u32,
    /// Longest streak ever reached in a single round.
    #[serde(default)]
    pub best_streak: u32,
}

impl AllTimeRecord {
    /// Construct an empty lifetime record for the given player.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Number of shots fired over all rounds.
    pub fn total_moves(&self) -> u32 {
        self.total_hits + self.total_misses
    }

    /// Apply the outcome of a shot. `streak` is the session streak after the shot.
    pub fn apply_shot(&mut self, outcome: &ShotOutcome, streak: u32) {
        if outcome.is_hit() {
            self.total_hits += 1;
        } else {
            self.total_misses += 1;
        }
        if outcome.sunk() {
            self.ships_sunk += 1;
        }
        if outcome.won() {
            self.games_won += 1;
        }
        self.best_streak = self.best_streak.max(streak);
    }
}

/// Record a shot by `player` on both leaderboards and return the player's updated session
/// record. When the shot wins the round, every player on the session leaderboard is
/// counted as having played a game.
pub fn apply_result<'a>(
    session: &'a mut Leaderboard,
    all_time: &mut AllTimeLeaderboard,
    player: &str,
    outcome: &ShotOutcome,
    now: DateTime<Utc>,
) -> &'a PlayerRecord {
    let record = session
        .entry(player.to_owned())
        .or_insert_with(|| PlayerRecord::new(player));
    record.username = player.to_owned();
    record.apply_shot(outcome, now);
    let streak = record.streak;

    all_time
        .entry(player.to_owned())
        .or_insert_with(|| AllTimeRecord::new(player))
        .apply_shot(outcome, streak);

    if outcome.won() {
        for (name, record) in session.iter_mut() {
            record.games_played += 1;
            all_time
                .entry(name.clone())
                .or_insert_with(|| AllTimeRecord::new(name.as_str()))
                .games_played += 1;
        }
    }
    &session[player]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_rounds_to_two_places() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(8, 2), 0.8);
        assert_eq!(accuracy(9, 2), 0.82);
        assert_eq!(accuracy(1, 2), 0.33);
        assert_eq!(accuracy(2, 1), 0.67);
    }

    #[test]
    fn hits_build_streaks_and_misses_reset_them() {
        let now = Utc::now();
        let mut session = Leaderboard::new();
        let mut all_time = AllTimeLeaderboard::new();
        let hit = ShotOutcome::Hit("carrier".into());
        for _ in 0..3 {
            apply_result(&mut session, &mut all_time, "bob", &hit, now);
        }
        let record = apply_result(&mut session, &mut all_time, "bob", &ShotOutcome::Miss, now);
        assert_eq!(record.hits, 3);
        assert_eq!(record.misses, 1);
        assert_eq!(record.streak, 0);
        assert_eq!(record.accuracy, 0.75);
        assert_eq!(record.last_move, Some(now));
        assert_eq!(all_time["bob"].best_streak, 3);
        assert_eq!(all_time["bob"].total_moves(), 4);
    }

    #[test]
    fn sinking_counts_in_both_records() {
        let now = Utc::now();
        let mut session = Leaderboard::new();
        let mut all_time = AllTimeLeaderboard::new();
        apply_result(&mut session, &mut all_time, "eve", &ShotOutcome::Sunk("patrol".into()), now);
        assert_eq!(session["eve"].ships_sunk, 1);
        assert_eq!(all_time["eve"].ships_sunk, 1);
        assert_eq!(session["eve"].games_won, 0);
    }

    #[test]
    fn win_counts_a_game_for_every_participant() {
        let now = Utc::now();
        let mut session = Leaderboard::new();
        let mut all_time = AllTimeLeaderboard::new();
        apply_result(&mut session, &mut all_time, "ann", &ShotOutcome::Miss, now);
        apply_result(&mut session, &mut all_time, "ben", &ShotOutcome::Hit("sub".into()), now);
        apply_result(&mut session, &mut all_time, "ben", &ShotOutcome::Victory("sub".into()), now);

        assert_eq!(session["ben"].games_won, 1);
        assert_eq!(all_time["ben"].games_won, 1);
        assert_eq!(session["ann"].games_won, 0);
        for name in &["ann", "ben"] {
            assert_eq!(session[*name].games_played, 1);
            assert_eq!(all_time[*name].games_played, 1);
        }
        assert_eq!(all_time["ben"].best_streak, 2);
    }

    #[test]
    fn old_records_without_newer_fields_still_load() {
        let json = r#"{"username": "old", "hits": 3, "misses": 1, "streak": 0}"#;
        let record: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.ships_sunk, 0);
        assert_eq!(record.last_move, None);
    }
}
