use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of rows on the board.
pub const ROWS: usize = 10;
/// Number of columns on the board.
pub const COLS: usize = 10;

/// Labels used for the rows, top to bottom.
const ROW_LABELS: &[u8; ROWS] = b"ABCDEFGHIJ";

/// The coordinates of a cell in the board. Rows and columns are zero-based; the
/// human-readable form uses a row letter and a one-based column, e.g. `B4`.
///
/// Ordering is row-major, so sorted collections of coordinates walk the board the same
/// way it is drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Coordinate {
    /// Vertical position of the cell, `0` is row `A`.
    pub row: usize,
    /// Horizontal position of the cell, `0` is column `1`.
    pub col: usize,
}

impl Coordinate {
    /// Construct a [`Coordinate`] from the given zero-based `row` and `col`. Does not
    /// check bounds.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns true if this coordinate lies on the board.
    pub fn in_bounds(&self) -> bool {
        self.row < ROWS && self.col < COLS
    }

    /// The row letter of this coordinate, if it is in bounds.
    pub fn row_label(&self) -> Option<char> {
        ROW_LABELS.get(self.row).map(|&b| b as char)
    }

    /// Get an iterator over every coordinate on the board in row-major order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| Coordinate { row, col }))
    }

    /// Label for the given row index, if it is in bounds.
    pub fn label_for_row(row: usize) -> Option<char> {
        ROW_LABELS.get(row).map(|&b| b as char)
    }
}

impl From<(usize, usize)> for Coordinate {
    /// Construct a [`Coordinate`] from the given `(row, col)` pair.
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.row_label() {
            Some(label) => f.pad(&format!("{}{}", label, self.col + 1)),
            None => f.pad(&format!("r{}c{}", self.row, self.col + 1)),
        }
    }
}

/// Error returned when a string is not a valid cell name.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("`{0}` is not a valid cell, use a row A-J and a column 1-10")]
pub struct ParseCoordinateError(String);

impl ParseCoordinateError {
    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    /// Parse a cell name like `B4` or `j10`. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordinateError(s.trim().to_owned());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let label = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let row = ROW_LABELS
            .iter()
            .position(|&b| b as char == label)
            .ok_or_else(err)?;
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        match digits.parse::<usize>() {
            Ok(col) if col >= 1 && col <= COLS => Ok(Coordinate::new(row, col - 1)),
            _ => Err(err()),
        }
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
