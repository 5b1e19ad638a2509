//! Heuristics that turn away abusive or scripted move attempts before they touch the board.
//!
//! Every check is a pure function of the persisted state and the time of the attempt. The
//! checks run in a fixed order and the first one to fail decides the [`Rejection`].

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    board::{Board, Coordinate, Mark},
    config::GameConfig,
    history::{MoveHistory, ShotResult},
    stats::{AllTimeRecord, PlayerRecord},
};

pub use self::{
    attempts::{AttemptLog, AttemptRecord},
    ip::{hash_ip, IpMove, IpRecord, IpTracking},
};

mod attempts;
mod ip;

/// Reason a move attempt was turned away. A rejected attempt never changes the game.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Rejection {
    /// The target cell already carries a mark.
    #[error("`{coord}` was already played and marked as `{mark}`.")]
    CellAlreadyPlayed { coord: Coordinate, mark: Mark },
    /// The player already tried this cell recently.
    #[error("You already tried `{coord}` recently at {at}. Try a different cell!")]
    RecentRepeat { coord: Coordinate, at: DateTime<Utc> },
    /// The player made too many moves in the last hour.
    #[error("Rate limit: Please wait {minutes} minutes before your next move.")]
    RateLimited { minutes: i64 },
    /// The player's recent moves are implausibly accurate.
    #[error("Pattern detected - your last {moves} moves were all hits. Please verify you're not using automated tools.")]
    Suspicious { moves: usize },
    /// The player fired too recently.
    #[error("Cooldown active: {hours}h {minutes}m remaining")]
    Cooldown { hours: i64, minutes: i64 },
}

impl Rejection {
    /// Short machine-readable tag recorded in the attempt log.
    pub fn tag(&self) -> &'static str {
        match self {
            Rejection::CellAlreadyPlayed { .. } => "cell_duplicate",
            Rejection::RecentRepeat { .. } => "move_spam",
            Rejection::RateLimited { .. } => "account_spam",
            Rejection::Suspicious { .. } => "multi_account",
            Rejection::Cooldown { .. } => "cooldown",
        }
    }
}

/// Direction of a run of consecutive moves.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Axis {
    Row,
    Column,
}

/// Non-blocking warning that a player's recent moves walk straight across the board.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PatternWarning {
    axis: Axis,
    cells: Vec<Coordinate>,
}

impl PatternWarning {
    /// Direction the moves walk in.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The moves that form the run, oldest first.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }
}

/// Reject the move if the cell already carries any mark.
pub fn check_cell(board: &Board, coord: Coordinate) -> Result<(), Rejection> {
    match board.get(&coord) {
        Some(Mark::Empty) | None => Ok(()),
        Some(mark) => Err(Rejection::CellAlreadyPlayed { coord, mark }),
    }
}

/// Reject the move if the player fired at the same cell within the last `window` history
/// entries.
pub fn check_recent_repeat(
    history: &MoveHistory,
    player: &str,
    coord: Coordinate,
    window: usize,
) -> Result<(), Rejection> {
    match history
        .recent(window)
        .find(|m| m.username == player && m.coord == coord)
    {
        Some(earlier) => Err(Rejection::RecentRepeat {
            coord,
            at: earlier.timestamp,
        }),
        None => Ok(()),
    }
}

/// Reject the move if the player already made `cap` moves in the hour before `now`. The
/// wait reported lasts until the oldest of those moves leaves the window. A cap of zero
/// disables the check.
pub fn check_rate_limit(
    history: &MoveHistory,
    player: &str,
    now: DateTime<Utc>,
    cap: usize,
) -> Result<(), Rejection> {
    if cap == 0 {
        return Ok(());
    }
    let window_start = now - Duration::hours(1);
    let in_window: Vec<DateTime<Utc>> = history
        .iter()
        .filter(|m| m.username == player && m.timestamp > window_start)
        .map(|m| m.timestamp)
        .collect();
    if in_window.len() < cap {
        return Ok(());
    }
    let oldest = in_window.iter().min().copied().unwrap_or(now);
    let wait = oldest + Duration::hours(1) - now;
    let minutes = (wait.num_seconds() + 59) / 60;
    Err(Rejection::RateLimited {
        minutes: minutes.max(1),
    })
}

/// Reject the move if the player's last `window` moves number at least `min_moves` and
/// every one of them was a hit.
pub fn check_perfect_play(
    history: &MoveHistory,
    player: &str,
    window: usize,
    min_moves: usize,
) -> Result<(), Rejection> {
    let recent = history.recent_by(player, window);
    if recent.is_empty() || recent.len() < min_moves {
        return Ok(());
    }
    if recent.iter().all(|m| m.result == ShotResult::Hit) {
        Err(Rejection::Suspicious {
            moves: recent.len(),
        })
    } else {
        Ok(())
    }
}

/// Reject the move if the player's cooldown has not run out. The cooldown length depends
/// on how many moves the player has made over all rounds. The owner account is exempt.
pub fn check_cooldown(
    player: &str,
    last_move: Option<DateTime<Utc>>,
    lifetime_moves: u32,
    now: DateTime<Utc>,
    config: &GameConfig,
) -> Result<(), Rejection> {
    if player == config.owner {
        return Ok(());
    }
    let last_move = match last_move {
        Some(last_move) => last_move,
        None => return Ok(()),
    };
    let remaining = config.cooldown_for(lifetime_moves) - (now - last_move);
    let secs = remaining.num_seconds();
    if secs > 0 {
        Err(Rejection::Cooldown {
            hours: secs / 3600,
            minutes: (secs % 3600) / 60,
        })
    } else {
        Ok(())
    }
}

/// Look for the player's last `threshold` moves walking one step at a time along a single
/// row or column. Never rejects.
pub fn detect_pattern(
    history: &MoveHistory,
    player: &str,
    threshold: usize,
) -> Option<PatternWarning> {
    if threshold == 0 {
        return None;
    }
    let cells: Vec<Coordinate> = history
        .recent_by(player, threshold)
        .into_iter()
        .map(|m| m.coord)
        .collect();
    if cells.len() < threshold {
        return None;
    }
    let steps = |axis: Axis| {
        cells.windows(2).all(|pair| match axis {
            Axis::Row => pair[0].row == pair[1].row && pair[0].col + 1 == pair[1].col,
            Axis::Column => pair[0].col == pair[1].col && pair[0].row + 1 == pair[1].row,
        })
    };
    let axis = if steps(Axis::Row) {
        Axis::Row
    } else if steps(Axis::Column) {
        Axis::Column
    } else {
        return None;
    };
    Some(PatternWarning { axis, cells })
}

/// A single move attempt by one player.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Attempt<'a> {
    /// Login of the player making the move.
    pub player: &'a str,
    /// Cell the player wants to fire at.
    pub coord: Coordinate,
    /// When the attempt was made.
    pub now: DateTime<Utc>,
}

/// Run every rejecting check in priority order: cell, recent repeat, rate limit, perfect
/// play, cooldown.
pub fn check_move(
    board: &Board,
    history: &MoveHistory,
    session: Option<&PlayerRecord>,
    all_time: Option<&AllTimeRecord>,
    attempt: Attempt,
    config: &GameConfig,
) -> Result<(), Rejection> {
    let Attempt { player, coord, now } = attempt;
    check_cell(board, coord)?;
    check_recent_repeat(history, player, coord, config.recent_repeat_window)?;
    check_rate_limit(history, player, now, config.rate_limit_per_hour)?;
    check_perfect_play(
        history,
        player,
        config.perfect_play_window,
        config.perfect_play_min_moves,
    )?;
    check_cooldown(
        player,
        session.and_then(|r| r.last_move),
        all_time.map_or(0, AllTimeRecord::total_moves),
        now,
        config,
    )
}
