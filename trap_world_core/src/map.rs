use std::ops::{Index, IndexMut};

use crate::Position;

/// Represents errors that can occur while building a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid has no rows or zero width")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    JaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A rectangular 2D grid.
///
/// Stores elements of type `T` in a flat vector using row-major order and is
/// addressed with [`Position`] coordinates (`x` = column, `y` = row).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    #[cfg(test)]
    pub fn filled(width: usize, height: usize, value: T) -> Self
    where
        T: Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![value; size],
        }
    }

    /// Builds a grid from a list of rows.
    ///
    /// Every row must have the same length as the first one; jagged input is
    /// rejected rather than padded.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.into_iter().enumerate() {
            if line.len() != width {
                return Err(GridError::JaggedRow {
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
            cells.extend(line);
        }

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks if the position lies inside the grid.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.y * self.width + pos.x)
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        self.index_of(pos).map(|index| &mut self.cells[index])
    }

    /// Replaces the cell at `pos`, returning the previous value.
    ///
    /// Returns `None` and leaves the grid untouched when `pos` is out of bounds.
    pub fn set(&mut self, pos: Position, value: T) -> Option<T> {
        self.get_mut(pos).map(|cell| std::mem::replace(cell, value))
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Position::new(index % width, index / width), cell))
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                pos.x, pos.y, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, pos: Position) -> &mut Self::Output {
        let (width, height) = (self.width, self.height);
        match self.index_of(pos) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                pos.x, pos.y, width, height
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_row_major() {
        let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid[Position::new(2, 0)], 3);
        assert_eq!(grid[Position::new(0, 1)], 4);

        let rows: Vec<&[i32]> = grid.rows().collect();
        assert_eq!(rows, vec![&[1, 2, 3][..], &[4, 5, 6][..]]);
    }

    #[test]
    fn jagged_rows_are_rejected() {
        let err = Grid::from_rows(vec![vec!['a', 'b'], vec!['c']]).unwrap_err();
        assert_eq!(
            err,
            GridError::JaggedRow {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(Grid::<u8>::from_rows(vec![]).unwrap_err(), GridError::Empty);
        assert_eq!(
            Grid::<u8>::from_rows(vec![vec![]]).unwrap_err(),
            GridError::Empty
        );
    }

    #[test]
    fn out_of_bounds_access_is_none() {
        let mut grid = Grid::filled(2, 2, 0u8);
        assert!(grid.get(Position::new(2, 0)).is_none());
        assert!(grid.get(Position::new(0, 2)).is_none());
        assert_eq!(grid.set(Position::new(5, 5), 9), None);
        assert_eq!(grid.set(Position::new(1, 1), 9), Some(0));
        assert_eq!(grid[Position::new(1, 1)], 9);
    }

    #[test]
    fn enumerate_reports_positions() {
        let grid = Grid::from_rows(vec![vec!['a', 'b'], vec!['c', 'd']]).unwrap();
        let found: Vec<_> = grid
            .enumerate()
            .filter(|(_, c)| **c == 'c')
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(found, vec![Position::new(0, 1)]);
    }
}
