//! Types used for defining ships and where they sit on the board.

use std::{
    collections::{BTreeMap, BTreeSet},
    iter::FromIterator,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Coordinate;

pub use self::{
    linear::{Line, Orientation},
    placement::{generate_ships, PlacementError},
};

mod linear;
mod placement;

/// Ships are identified by their name, e.g. `"carrier"`.
pub type ShipId = String;

/// A ship the placement generator has to put on the board.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShipSpec {
    /// Name of the ship, used as its [`ShipId`].
    pub name: ShipId,
    /// Number of cells the ship occupies.
    pub size: usize,
}

impl ShipSpec {
    /// Construct a ship spec with the given name and size.
    pub fn new(name: impl Into<ShipId>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Get the shape of this ship.
    pub fn shape(&self) -> Line {
        Line::new(self.size)
    }
}

/// The standard fleet, in placement order.
pub fn standard_fleet() -> Vec<ShipSpec> {
    vec![
        ShipSpec::new("carrier", 5),
        ShipSpec::new("battleship", 4),
        ShipSpec::new("submarine", 3),
        ShipSpec::new("destroyer", 2),
        ShipSpec::new("patrol", 2),
    ]
}

/// Reason why a ship could not be added to a [`ShipMap`].
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotPlaceReason {
    /// One of the cells is not on the board.
    #[error("the requested position is not on the board")]
    OutOfBounds,
    /// One or more of the cells is already occupied by another ship.
    #[error("the requested position was already occupied")]
    AlreadyOccupied,
}

/// Problems found when checking a [`ShipMap`] against the fleet it should hold.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FleetError {
    /// The map holds a ship that is not part of the fleet.
    #[error("unknown ship {0:?}")]
    UnknownShip(ShipId),
    /// A ship occupies the wrong number of cells.
    #[error("ship {ship:?} occupies {actual} cells, expected {expected}")]
    WrongSize {
        ship: ShipId,
        expected: usize,
        actual: usize,
    },
    /// A ship's cells do not form one straight run.
    #[error("ship {0:?} is not a straight, unbroken line")]
    NotContiguous(ShipId),
}

/// Mapping of board cells to the ship that occupies them. No cell holds more than one
/// ship by construction.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipMap {
    cells: BTreeMap<Coordinate, ShipId>,
}

impl ShipMap {
    /// Construct an empty ship map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ship occupying the given cell, if any.
    pub fn get(&self, coord: &Coordinate) -> Option<&str> {
        self.cells.get(coord).map(String::as_str)
    }

    /// Returns true if a ship occupies the given cell.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.cells.contains_key(coord)
    }

    /// Total number of ship cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no ships have been placed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate every ship cell and the ship that occupies it.
    pub fn iter(&self) -> impl '_ + Iterator<Item = (&Coordinate, &str)> {
        self.cells.iter().map(|(c, s)| (c, s.as_str()))
    }

    /// Iterate every ship cell.
    pub fn coords(&self) -> impl '_ + Iterator<Item = &Coordinate> {
        self.cells.keys()
    }

    /// Iterate the cells occupied by the given ship.
    pub fn ship_coords<'a>(&'a self, ship: &'a str) -> impl 'a + Iterator<Item = &'a Coordinate> {
        self.cells
            .iter()
            .filter(move |(_, s)| s.as_str() == ship)
            .map(|(c, _)| c)
    }

    /// Number of cells occupied by the given ship.
    pub fn ship_size(&self, ship: &str) -> usize {
        self.ship_coords(ship).count()
    }

    /// Names of every ship on the map, sorted.
    pub fn ships(&self) -> BTreeSet<&str> {
        self.cells.values().map(String::as_str).collect()
    }

    /// Add a ship on the given cells. Nothing is added if any cell is off the board or
    /// already taken.
    pub fn place(&mut self, ship: &str, cells: &[Coordinate]) -> Result<(), CannotPlaceReason> {
        if cells.iter().any(|c| !c.in_bounds()) {
            return Err(CannotPlaceReason::OutOfBounds);
        }
        if cells.iter().any(|c| self.cells.contains_key(c)) {
            return Err(CannotPlaceReason::AlreadyOccupied);
        }
        for &coord in cells {
            self.cells.insert(coord, ship.to_owned());
        }
        Ok(())
    }

    /// Check that this map holds exactly the given fleet, each ship as a straight line
    /// of the right size.
    pub fn validate(&self, fleet: &[ShipSpec]) -> Result<(), FleetError> {
        if let Some(unknown) = self
            .ships()
            .into_iter()
            .find(|name| !fleet.iter().any(|spec| spec.name == *name))
        {
            return Err(FleetError::UnknownShip(unknown.to_owned()));
        }
        for spec in fleet {
            let cells: Vec<Coordinate> = self.ship_coords(&spec.name).copied().collect();
            if cells.len() != spec.size {
                return Err(FleetError::WrongSize {
                    ship: spec.name.clone(),
                    expected: spec.size,
                    actual: cells.len(),
                });
            }
            if !spec.shape().is_valid_placement(&cells) {
                return Err(FleetError::NotContiguous(spec.name.clone()));
            }
        }
        Ok(())
    }
}

impl FromIterator<(Coordinate, ShipId)> for ShipMap {
    fn from_iter<T: IntoIterator<Item = (Coordinate, ShipId)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
