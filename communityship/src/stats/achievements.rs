//! Badges players unlock by playing.

use std::{convert::TryFrom, fmt};

use enumflags2::BitFlags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::PlayerRecord;

/// An unlockable badge.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Achievement {
    /// 80%+ accuracy with 10+ moves.
    Sharpshooter = 0b00_0001,
    /// 5 hits in a row.
    HotStreak = 0b00_0010,
    /// The player's first move was a hit.
    FirstBlood = 0b00_0100,
    /// Sank a ship.
    ShipSinker = 0b00_1000,
    /// Sank 3 or more ships in one game.
    FleetDestroyer = 0b01_0000,
    /// Won a game.
    VictoryRoyale = 0b10_0000,
}

impl Achievement {
    /// Every achievement, in display order.
    pub const ALL: [Achievement; 6] = [
        Achievement::Sharpshooter,
        Achievement::HotStreak,
        Achievement::FirstBlood,
        Achievement::ShipSinker,
        Achievement::FleetDestroyer,
        Achievement::VictoryRoyale,
    ];

    /// Emoji shown next to the badge name.
    pub fn emoji(self) -> &'static str {
        match self {
            Achievement::Sharpshooter => "🎯",
            Achievement::HotStreak => "🔥",
            Achievement::FirstBlood => "⚡",
            Achievement::ShipSinker => "🚢",
            Achievement::FleetDestroyer => "💀",
            Achievement::VictoryRoyale => "🏆",
        }
    }

    /// Human readable name of the badge.
    pub fn name(self) -> &'static str {
        match self {
            Achievement::Sharpshooter => "Sharpshooter",
            Achievement::HotStreak => "Hot Streak",
            Achievement::FirstBlood => "First Blood",
            Achievement::ShipSinker => "Ship Sinker",
            Achievement::FleetDestroyer => "Fleet Destroyer",
            Achievement::VictoryRoyale => "Victory Royale",
        }
    }

    /// Description of what unlocks the badge.
    pub fn condition(self) -> &'static str {
        match self {
            Achievement::Sharpshooter => "80%+ accuracy with 10+ moves",
            Achievement::HotStreak => "5 hits in a row",
            Achievement::FirstBlood => "First move of the game is a hit",
            Achievement::ShipSinker => "Sink your first ship in a game",
            Achievement::FleetDestroyer => "Sink 3 or more ships in a game",
            Achievement::VictoryRoyale => "Win a game",
        }
    }

    /// Find the achievement with the given label, e.g. `"🎯 Sharpshooter"`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.to_string() == label)
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("{} {}", self.emoji(), self.name()))
    }
}

/// Returns the badges the player has earned but does not hold yet.
pub fn check_achievements(
    player: &PlayerRecord,
    game_won: bool,
    held: BitFlags<Achievement>,
) -> BitFlags<Achievement> {
    let total = player.total_moves();
    let mut earned = BitFlags::empty();
    if player.accuracy >= 0.8 && total >= 10 {
        earned.insert(Achievement::Sharpshooter);
    }
    if player.streak >= 5 {
        earned.insert(Achievement::HotStreak);
    }
    if player.hits == 1 && player.misses == 0 {
        earned.insert(Achievement::FirstBlood);
    }
    if player.ships_sunk >= 1 {
        earned.insert(Achievement::ShipSinker);
    }
    if player.ships_sunk >= 3 {
        earned.insert(Achievement::FleetDestroyer);
    }
    if game_won {
        earned.insert(Achievement::VictoryRoyale);
    }

    let mut new = BitFlags::empty();
    for &achievement in Achievement::ALL.iter() {
        if earned.contains(achievement) && !held.contains(achievement) {
            new.insert(achievement);
        }
    }
    new
}

/// Error returned when a stored badge label isn't known.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("unknown badge {0:?}")]
pub struct UnknownBadge(String);

/// Badges held by a player, in the order they were unlocked.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Badges(Vec<Achievement>);

impl Badges {
    /// Construct an empty badge collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of badges held.
    pub fn flags(&self) -> BitFlags<Achievement> {
        let mut flags = BitFlags::empty();
        for &badge in &self.0 {
            flags.insert(badge);
        }
        flags
    }

    /// Returns true if the badge is held.
    pub fn contains(&self, badge: Achievement) -> bool {
        self.0.contains(&badge)
    }

    /// Add every badge in `new` that isn't already held, in display order. Returns the
    /// badges actually added.
    pub fn unlock(&mut self, new: BitFlags<Achievement>) -> Vec<Achievement> {
        let mut added = Vec::new();
        for &badge in Achievement::ALL.iter() {
            if new.contains(badge) && !self.contains(badge) {
                self.0.push(badge);
                added.push(badge);
            }
        }
        added
    }

    /// Iterate the held badges in unlock order.
    pub fn iter(&self) -> impl '_ + Iterator<Item = Achievement> {
        self.0.iter().copied()
    }

    /// Number of badges held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no badges are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for Badges {
    type Error = UnknownBadge;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        let mut badges = Badges::new();
        for label in labels {
            let badge = Achievement::from_label(&label).ok_or(UnknownBadge(label))?;
            if !badges.contains(badge) {
                badges.0.push(badge);
            }
        }
        Ok(badges)
    }
}

impl From<Badges> for Vec<String> {
    fn from(badges: Badges) -> Self {
        badges.iter().map(|b| b.to_string()).collect()
    }
}

/// Badges earned by one player, kept across rounds.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerBadges {
    /// Login of the player.
    pub username: String,
    /// Badges unlocked so far.
    #[serde(default)]
    pub badges: Badges,
}

impl PlayerBadges {
    /// Construct an empty badge record for the given player.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            badges: Badges::new(),
        }
    }
}
