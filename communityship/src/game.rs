//! Resolution of shots against the shared board.

use crate::{
    board::{Board, Coordinate, Mark, ShotError},
    ships::{ShipId, ShipMap},
};

pub use self::status::{fleet_status, ShipStatus};

mod status;

/// Outcome of a successfully-fired shot.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ShotOutcome {
    /// Nothing was hit.
    Miss,
    /// The given ship was hit but it was not sunk.
    Hit(ShipId),
    /// The given ship was hit and sunk, but other ships remain afloat.
    Sunk(ShipId),
    /// The given ship was hit and sunk, and it was the last ship afloat.
    Victory(ShipId),
}

impl ShotOutcome {
    /// Returns true if the shot hit a ship.
    pub fn is_hit(&self) -> bool {
        !matches!(self, ShotOutcome::Miss)
    }

    /// Returns true if the shot sank the ship it hit.
    pub fn sunk(&self) -> bool {
        matches!(self, ShotOutcome::Sunk(_) | ShotOutcome::Victory(_))
    }

    /// Returns true if the shot ended the round.
    pub fn won(&self) -> bool {
        matches!(self, ShotOutcome::Victory(_))
    }

    /// Get the id of the ship that was hit.
    pub fn ship(&self) -> Option<&str> {
        match self {
            ShotOutcome::Miss => None,
            ShotOutcome::Hit(ref id) | ShotOutcome::Sunk(ref id) | ShotOutcome::Victory(ref id) => {
                Some(id)
            }
        }
    }

    /// Extract the id of the ship that was hit from this result.
    pub fn into_ship(self) -> Option<ShipId> {
        match self {
            ShotOutcome::Miss => None,
            ShotOutcome::Hit(id) | ShotOutcome::Sunk(id) | ShotOutcome::Victory(id) => Some(id),
        }
    }
}

/// Fire at `coord`, marking the board with a hit or a miss. Cells that were already
/// played are rejected without touching the board. The ship map is never modified.
pub fn resolve(board: &mut Board, ships: &ShipMap, coord: Coordinate) -> Result<ShotOutcome, ShotError> {
    let cell = board
        .get_mut(&coord)
        .ok_or_else(|| ShotError::invalid(coord))?;
    if cell.played() {
        return Err(ShotError::already_played(coord, *cell));
    }
    let ship = match ships.get(&coord) {
        None => {
            *cell = Mark::Miss;
            return Ok(ShotOutcome::Miss);
        }
        Some(ship) => {
            *cell = Mark::Hit;
            ship.to_owned()
        }
    };
    Ok(if is_game_won(board, ships) {
        ShotOutcome::Victory(ship)
    } else if is_sunk(board, ships, &ship) {
        ShotOutcome::Sunk(ship)
    } else {
        ShotOutcome::Hit(ship)
    })
}

/// Returns true if every cell of the given ship has been hit.
pub fn is_sunk(board: &Board, ships: &ShipMap, ship: &str) -> bool {
    let size = ships.ship_size(ship);
    size > 0 && hits_on(board, ships, ship) == size
}

/// Count the hits on the given ship.
pub fn hits_on(board: &Board, ships: &ShipMap, ship: &str) -> usize {
    ships
        .ship_coords(ship)
        .filter(|c| board.get(c) == Some(Mark::Hit))
        .count()
}

/// Returns true if every ship cell on the map has been hit. A map with no ships can never
/// be won.
pub fn is_game_won(board: &Board, ships: &ShipMap) -> bool {
    !ships.is_empty() && ships.coords().all(|c| board.get(c) == Some(Mark::Hit))
}

/// Number of ship cells not yet hit.
pub fn remaining_ship_cells(board: &Board, ships: &ShipMap) -> usize {
    ships
        .coords()
        .filter(|c| board.get(c) != Some(Mark::Hit))
        .count()
}
