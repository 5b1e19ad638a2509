//! Types that make up the shared game board.

use std::{
    collections::BTreeMap,
    convert::TryFrom,
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use self::{
    coordinate::{Coordinate, ParseCoordinateError, COLS, ROWS},
    errors::{BoardShapeError, CannotShootReason, ShotError},
};

mod coordinate;
mod errors;

/// State of a single cell on the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Nobody has fired at this cell.
    #[serde(rename = "")]
    Empty,
    /// A shot at this cell hit a ship.
    #[serde(rename = "X")]
    Hit,
    /// A shot at this cell hit only water.
    #[serde(rename = "O")]
    Miss,
    /// A ship cell that was never hit, shown once the round is over.
    #[serde(rename = "🚢")]
    Revealed,
}

impl Mark {
    /// Returns true if a shot has already been fired at a cell with this mark.
    pub fn played(self) -> bool {
        match self {
            Mark::Hit | Mark::Miss => true,
            Mark::Empty | Mark::Revealed => false,
        }
    }

    /// The symbol stored for this mark in the board file.
    pub fn symbol(self) -> &'static str {
        match self {
            Mark::Empty => "",
            Mark::Hit => "X",
            Mark::Miss => "O",
            Mark::Revealed => "🚢",
        }
    }
}

impl Default for Mark {
    fn default() -> Self {
        Mark::Empty
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Mark::Empty => "empty",
            Mark::Hit => "💥 Hit",
            Mark::Miss => "🌊 Miss",
            Mark::Revealed => "🚢 Ship",
        })
    }
}

/// The 10x10 board everyone fires at. Always holds exactly one [`Mark`] per cell.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Coordinate, Mark>",
    into = "BTreeMap<Coordinate, Mark>"
)]
pub struct Board {
    /// Cells in row-major order.
    cells: Box<[Mark]>,
}

impl Board {
    /// Construct a board where every cell is [`Mark::Empty`].
    pub fn new() -> Self {
        Self {
            cells: vec![Mark::Empty; ROWS * COLS].into_boxed_slice(),
        }
    }

    /// Convert a coordinate to an index into the cells. Returns `None` if the
    /// coordinate is out of bounds.
    #[inline]
    fn linearize(coord: &Coordinate) -> Option<usize> {
        if coord.in_bounds() {
            Some(coord.row * COLS + coord.col)
        } else {
            None
        }
    }

    /// Get the mark at the given coordinate, or `None` if it is out of bounds.
    pub fn get(&self, coord: &Coordinate) -> Option<Mark> {
        Self::linearize(coord).map(|i| self.cells[i])
    }

    /// Get a mutable reference to the mark at the given coordinate.
    pub fn get_mut(&mut self, coord: &Coordinate) -> Option<&mut Mark> {
        Self::linearize(coord).map(move |i| &mut self.cells[i])
    }

    /// Iterate over every cell and its mark in row-major order.
    pub fn iter(&self) -> impl '_ + Iterator<Item = (Coordinate, Mark)> {
        Coordinate::all().zip(self.cells.iter().copied())
    }

    /// Get an iterator over the rows of the board. Each row is an iterator over the
    /// coordinates and marks of that row.
    pub fn iter_rows(
        &self,
    ) -> impl '_ + Iterator<Item = impl '_ + Iterator<Item = (Coordinate, Mark)>> {
        self.cells.chunks(COLS).enumerate().map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &mark)| (Coordinate::new(row, col), mark))
        })
    }

    /// Iterate the coordinates of every cell carrying `mark`.
    pub fn cells_marked(&self, mark: Mark) -> impl '_ + Iterator<Item = Coordinate> {
        self.iter()
            .filter(move |&(_, m)| m == mark)
            .map(|(coord, _)| coord)
    }

    /// Count the cells carrying `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|&&m| m == mark).count()
    }

    /// Count the cells that have been fired at.
    pub fn played(&self) -> usize {
        self.cells.iter().filter(|m| m.played()).count()
    }

    /// SHA-256 over every `cell=symbol` pair in row-major order, as lowercase hex.
    /// Two boards with the same marks always give the same checksum.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for (coord, mark) in self.iter() {
            hasher.update(format!("{}={};", coord, mark.symbol()).as_bytes());
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Coordinate> for Board {
    type Output = Mark;

    fn index(&self, coord: Coordinate) -> &Self::Output {
        let i = Self::linearize(&coord).expect("coordinate out of bounds");
        &self.cells[i]
    }
}

impl IndexMut<Coordinate> for Board {
    fn index_mut(&mut self, coord: Coordinate) -> &mut Self::Output {
        let i = Self::linearize(&coord).expect("coordinate out of bounds");
        &mut self.cells[i]
    }
}

impl TryFrom<BTreeMap<Coordinate, Mark>> for Board {
    type Error = BoardShapeError;

    /// Rebuild a board from stored cells. Every cell must be present; parsing the keys
    /// already guarantees none are out of bounds.
    fn try_from(cells: BTreeMap<Coordinate, Mark>) -> Result<Self, Self::Error> {
        if cells.len() != ROWS * COLS {
            return Err(BoardShapeError {
                found: cells.len(),
                expected: ROWS * COLS,
            });
        }
        Ok(Self {
            cells: cells.into_iter().map(|(_, mark)| mark).collect(),
        })
    }
}

impl From<Board> for BTreeMap<Coordinate, Mark> {
    fn from(board: Board) -> Self {
        board.iter().collect()
    }
}
