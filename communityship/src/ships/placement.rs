//! Random placement of a fleet onto an empty board.

use rand::Rng;
use thiserror::Error;

use crate::{
    board::{Coordinate, COLS, ROWS},
    ships::{Orientation, ShipId, ShipMap, ShipSpec},
};

/// Error returned when a ship could not be fit onto the board.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("failed to place {ship} (size {size}) after {attempts} attempts")]
pub struct PlacementError {
    /// Ship that could not be placed.
    ship: ShipId,
    /// Size of that ship.
    size: usize,
    /// Number of attempts made before giving up.
    attempts: usize,
}

impl PlacementError {
    /// The ship that could not be placed.
    pub fn ship(&self) -> &str {
        &self.ship
    }

    /// The size of the ship that could not be placed.
    pub fn size(&self) -> usize {
        self.size
    }

    /// How many random placements were tried.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

/// Randomly place every ship in `fleet`, in order, without overlap. Each ship gets up to
/// `max_attempts` random anchors and orientations. If any ship can't be placed the whole
/// layout is discarded.
pub fn generate_ships<R: Rng + ?Sized>(
    rng: &mut R,
    fleet: &[ShipSpec],
    max_attempts: usize,
) -> Result<ShipMap, PlacementError> {
    let mut map = ShipMap::new();
    for spec in fleet {
        if !place_ship(rng, &mut map, spec, max_attempts) {
            return Err(PlacementError {
                ship: spec.name.clone(),
                size: spec.size,
                attempts: max_attempts,
            });
        }
    }
    log::debug!("placed {} ships over {} cells", fleet.len(), map.len());
    Ok(map)
}

/// Try to place a single ship. Returns true once it has been placed.
fn place_ship<R: Rng + ?Sized>(
    rng: &mut R,
    map: &mut ShipMap,
    spec: &ShipSpec,
    max_attempts: usize,
) -> bool {
    let shape = spec.shape();
    for attempt in 0..max_attempts {
        let dir: Orientation = rng.gen();
        let start = Coordinate::new(rng.gen_range(0, ROWS), rng.gen_range(0, COLS));
        let cells = match shape.project(start, dir) {
            Some(cells) => cells,
            None => continue,
        };
        if map.place(&spec.name, &cells).is_ok() {
            log::debug!(
                "placed {} at {} {:?} after {} attempts",
                spec.name,
                start,
                dir,
                attempt + 1
            );
            return true;
        }
    }
    false
}
