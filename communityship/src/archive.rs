//! Snapshots of finished rounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, Mark},
    history::MoveHistory,
    ships::ShipMap,
    stats::{AchievementBook, Leaderboard},
};

/// Copy of the board with every ship cell that was never hit marked as revealed.
pub fn reveal(board: &Board, ships: &ShipMap) -> Board {
    let mut revealed = board.clone();
    for coord in ships.coords() {
        if let Some(cell) = revealed.get_mut(coord) {
            if *cell == Mark::Empty {
                *cell = Mark::Revealed;
            }
        }
    }
    revealed
}

/// Immutable record of a finished round. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundArchive {
    #[serde(rename = "round_number")]
    round: u32,
    timestamp: DateTime<Utc>,
    winner: Option<String>,
    board: Board,
    revealed_board: Board,
    /// [`Board::checksum`] of `board`, empty for archives written without one.
    #[serde(default)]
    board_checksum: String,
    #[serde(default)]
    leaderboard: Leaderboard,
    #[serde(default)]
    move_history: MoveHistory,
    #[serde(default)]
    achievements: AchievementBook,
}

impl RoundArchive {
    /// Snapshot a round. The revealed board is derived from `board` and `ships`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        round: u32,
        timestamp: DateTime<Utc>,
        winner: Option<String>,
        board: &Board,
        ships: &ShipMap,
        leaderboard: &Leaderboard,
        move_history: &MoveHistory,
        achievements: &AchievementBook,
    ) -> Self {
        Self {
            round,
            timestamp,
            winner,
            board: board.clone(),
            revealed_board: reveal(board, ships),
            board_checksum: board.checksum(),
            leaderboard: leaderboard.clone(),
            move_history: move_history.clone(),
            achievements: achievements.clone(),
        }
    }

    /// Number of the round, starting at 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// When the round was archived.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Player who sank the last ship, if the round was won.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Board as it stood when the round ended.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Final board with the unhit ship cells shown.
    pub fn revealed_board(&self) -> &Board {
        &self.revealed_board
    }

    /// Checksum of the final board, taken when the round was archived.
    pub fn board_checksum(&self) -> &str {
        &self.board_checksum
    }

    /// Returns true if the stored board still matches its checksum. Archives written
    /// without a checksum can't be checked and count as intact.
    pub fn is_intact(&self) -> bool {
        self.board_checksum.is_empty() || self.board_checksum == self.board.checksum()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn move_history(&self) -> &MoveHistory {
        &self.move_history
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    /// File name the archive is stored under, e.g. `round_007.json`.
    pub fn file_name(&self) -> String {
        file_name(self.round)
    }
}

/// File name for the archive of the given round.
pub fn file_name(round: u32) -> String {
    format!("round_{:03}.json", round)
}
