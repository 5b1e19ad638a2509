//! Tunable game rules.

use std::{fs, io, path::Path};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ships::{standard_fleet, ShipSpec};

/// Error loading a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Every tunable rule of the game. Missing fields take their default value, so a config
/// file only has to name the rules it changes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Account exempt from the cooldown.
    pub owner: String,
    /// Cooldown for players with fewer than `active_moves` lifetime moves.
    pub cooldown_base_minutes: i64,
    /// Cooldown for players with `active_moves` to `veteran_moves` lifetime moves.
    pub cooldown_active_minutes: i64,
    /// Cooldown for players with more than `veteran_moves` lifetime moves.
    pub cooldown_veteran_minutes: i64,
    pub active_moves: u32,
    pub veteran_moves: u32,
    /// Number of consecutive moves that make up a suspicious straight run.
    pub pattern_threshold: usize,
    /// Number of moves kept in the move history.
    pub history_limit: usize,
    /// Number of history entries searched for a repeated move.
    pub recent_repeat_window: usize,
    /// Moves allowed per player per hour. Zero disables the limit.
    pub rate_limit_per_hour: usize,
    /// Number of a player's latest moves checked for perfect play.
    pub perfect_play_window: usize,
    /// Fewest moves in the window before perfect play is suspicious.
    pub perfect_play_min_moves: usize,
    /// Random tries per ship when placing the fleet.
    pub placement_attempts: usize,
    /// Number of rejected attempts kept for review.
    pub attempt_log_limit: usize,
    /// Number of moves kept per hashed IP.
    pub ip_move_limit: usize,
    /// Violations at which an IP is reported as suspicious.
    pub suspicious_ip_violations: u32,
    /// An IP used by more than this many accounts is reported as suspicious.
    pub suspicious_ip_users: usize,
    /// Ships to place each round, in placement order.
    pub fleet: Vec<ShipSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            owner: "TheM1ddleM1n".to_owned(),
            cooldown_base_minutes: 120,
            cooldown_active_minutes: 90,
            cooldown_veteran_minutes: 60,
            active_moves: 20,
            veteran_moves: 50,
            pattern_threshold: 5,
            history_limit: 50,
            recent_repeat_window: 50,
            rate_limit_per_hour: 2,
            perfect_play_window: 5,
            perfect_play_min_moves: 3,
            placement_attempts: 100,
            attempt_log_limit: 1000,
            ip_move_limit: 100,
            suspicious_ip_violations: 5,
            suspicious_ip_users: 3,
            fleet: standard_fleet(),
        }
    }
}

impl GameConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Cooldown that applies to a player with the given number of lifetime moves.
    pub fn cooldown_for(&self, lifetime_moves: u32) -> Duration {
        let minutes = if lifetime_moves < self.active_moves {
            self.cooldown_base_minutes
        } else if lifetime_moves <= self.veteran_moves {
            self.cooldown_active_minutes
        } else {
            self.cooldown_veteran_minutes
        };
        Duration::minutes(minutes)
    }

    /// Total number of cells the fleet occupies.
    pub fn fleet_cells(&self) -> usize {
        self.fleet.iter().map(|ship| ship.size).sum()
    }
}
