// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::board::{Coordinate, COLS, ROWS};

/// Placement orientation of a ship.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Orientation {
    /// The ship runs left to right along a row.
    Horizontal,
    /// The ship runs top to bottom along a column.
    Vertical,
}

impl Distribution<Orientation> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Orientation {
        if rng.gen() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

/// A linear ship shape, with a given length.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Line(usize);

impl Line {
    /// Construct a linear ship with the specified length.
    pub fn new(len: usize) -> Self {
        Line(len)
    }

    /// Get the length of this ship.
    pub fn len(&self) -> usize {
        self.0
    }

    /// Project this line onto the board starting at `start` and running along `dir`.
    /// Returns `None` if the line is empty or any cell would fall off the board.
    pub fn project(&self, start: Coordinate, dir: Orientation) -> Option<Vec<Coordinate>> {
        if self.0 == 0 || !start.in_bounds() {
            return None;
        }
        let (last_row, last_col) = match dir {
            Orientation::Horizontal => (start.row, start.col + self.0 - 1),
            Orientation::Vertical => (start.row + self.0 - 1, start.col),
        };
        if last_row >= ROWS || last_col >= COLS {
            return None;
        }
        Some(
            (0..self.0)
                .map(|i| match dir {
                    Orientation::Horizontal => Coordinate::new(start.row, start.col + i),
                    Orientation::Vertical => Coordinate::new(start.row + i, start.col),
                })
                .collect(),
        )
    }

    /// Return true if the given cells are a valid placement of this line: the right
    /// number of cells, all on the board, forming one unbroken run along a single row or
    /// column. The cells may be given in any order.
    pub fn is_valid_placement(&self, cells: &[Coordinate]) -> bool {
        if cells.len() != self.0 || cells.iter().any(|c| !c.in_bounds()) {
            return false;
        }
        let mut sorted = cells.to_vec();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != self.0 {
            return false;
        }
        let start = sorted[0];
        let dir = if sorted.iter().all(|c| c.row == start.row) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        self.project(start, dir)
            .map_or(false, |expected| expected == sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(names: &[&str]) -> Vec<Coordinate> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[test]
    fn projects_along_row_and_column() {
        let line = Line::new(3);
        let start = "B4".parse().unwrap();
        assert_eq!(
            line.project(start, Orientation::Horizontal),
            Some(coords(&["B4", "B5", "B6"]))
        );
        assert_eq!(
            line.project(start, Orientation::Vertical),
            Some(coords(&["B4", "C4", "D4"]))
        );
    }

    #[test]
    fn projection_stops_at_edge() {
        let line = Line::new(2);
        assert_eq!(
            line.project("A10".parse().unwrap(), Orientation::Horizontal),
            None
        );
        assert_eq!(
            line.project("J1".parse().unwrap(), Orientation::Vertical),
            None
        );
        assert!(line
            .project("I10".parse().unwrap(), Orientation::Vertical)
            .is_some());
        assert_eq!(Line::new(0).project(Coordinate::new(0, 0), Orientation::Vertical), None);
    }

    #[test]
    fn validates_runs() {
        let line = Line::new(3);
        assert!(line.is_valid_placement(&coords(&["C2", "C3", "C4"])));
        assert!(line.is_valid_placement(&coords(&["E7", "C7", "D7"])));
        assert!(!line.is_valid_placement(&coords(&["C2", "C3", "C5"])));
        assert!(!line.is_valid_placement(&coords(&["C2", "D3", "E4"])));
        assert!(!line.is_valid_placement(&coords(&["C2", "C3"])));
        assert!(!line.is_valid_placement(&coords(&["C2", "C2", "C3"])));
        assert!(Line::new(1).is_valid_placement(&coords(&["B4"])));
    }
}
