use crate::{
    board::Board,
    game::hits_on,
    ships::{ShipMap, ShipSpec},
};

/// Damage report for a single ship.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ShipStatus {
    /// Name of the ship.
    pub name: String,
    /// Configured size of the ship.
    pub size: usize,
    /// Number of the ship's cells that have been hit.
    pub hits: usize,
}

impl ShipStatus {
    /// Check if this ship has been sunk.
    pub fn sunk(&self) -> bool {
        self.size > 0 && self.hits == self.size
    }

    /// Check if this ship has been hit at least once without being sunk.
    pub fn damaged(&self) -> bool {
        self.hits > 0 && !self.sunk()
    }
}

/// Get the status of every ship in the fleet, in fleet order.
pub fn fleet_status(board: &Board, ships: &ShipMap, fleet: &[ShipSpec]) -> Vec<ShipStatus> {
    fleet
        .iter()
        .map(|spec| ShipStatus {
            name: spec.name.clone(),
            size: spec.size,
            hits: hits_on(board, ships, &spec.name),
        })
        .collect()
}
