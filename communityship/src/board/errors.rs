//! Errors used by the [`Board`][crate::board::Board].

use thiserror::Error;

use crate::board::{Coordinate, Mark};

/// Reason why a particular cell could not be shot.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotShootReason {
    /// The cell selected is not on the board.
    #[error("the target coordinate is not on the board")]
    InvalidCoordinate,

    /// The cell was already marked as a hit or a miss.
    #[error("the target cell was already played")]
    AlreadyPlayed,
}

/// Error returned when trying to shoot a cell.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("could not shoot cell {coord}: {reason}")]
pub struct ShotError {
    /// Reason why the cell could not be shot.
    reason: CannotShootReason,

    /// The coordinates of the cell.
    coord: Coordinate,

    /// Mark already on the cell, if it was already played.
    mark: Option<Mark>,
}

impl ShotError {
    /// Construct a shot error for a cell outside the board.
    pub(crate) fn invalid(coord: Coordinate) -> Self {
        Self {
            reason: CannotShootReason::InvalidCoordinate,
            coord,
            mark: None,
        }
    }

    /// Construct a shot error for a cell that already carries `mark`.
    pub(crate) fn already_played(coord: Coordinate, mark: Mark) -> Self {
        Self {
            reason: CannotShootReason::AlreadyPlayed,
            coord,
            mark: Some(mark),
        }
    }

    /// Get the reason the shot failed.
    pub fn reason(&self) -> CannotShootReason {
        self.reason
    }

    /// Get the coordinate of the shot cell.
    pub fn coord(&self) -> &Coordinate {
        &self.coord
    }

    /// The mark found on the cell when it had already been played.
    pub fn mark(&self) -> Option<Mark> {
        self.mark
    }
}

/// Error returned when a stored board does not cover the whole grid.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("board has {found} of {expected} cells")]
pub struct BoardShapeError {
    /// Number of cells that were present.
    pub(crate) found: usize,
    /// Number of cells a full board has.
    pub(crate) expected: usize,
}
