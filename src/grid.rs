//! Fixed 6×22 floating-point colour grid.

use chroma_transport::{COLS, ROWS};

use crate::error::EffectError;

/// One RGB cell, each channel in `0.0..=1.0`.
pub type Cell = [f64; 3];

pub const BLACK: Cell = [0.0, 0.0, 0.0];

/// A full keyboard worth of colours. The dimensions are part of the type,
/// so a constructed grid can never change shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    cells: [[Cell; COLS]; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::blank()
    }
}

impl Grid {
    pub fn blank() -> Self {
        Self::filled(BLACK)
    }

    pub fn filled(cell: Cell) -> Self {
        Self {
            cells: [[cell; COLS]; ROWS],
        }
    }

    /// Build from nested rows, rejecting anything that is not exactly 6×22
    /// or carries a channel outside `0.0..=1.0`.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, EffectError> {
        if rows.len() != ROWS {
            return Err(EffectError::RowCount {
                expected: ROWS,
                actual: rows.len(),
            });
        }

        let mut grid = Self::blank();
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != COLS {
                return Err(EffectError::ColumnCount {
                    row: r,
                    expected: COLS,
                    actual: row.len(),
                });
            }
            for (c, cell) in row.into_iter().enumerate() {
                if let Some(&value) = cell
                    .iter()
                    .find(|v| !v.is_finite() || !(0.0..=1.0).contains(*v))
                {
                    return Err(EffectError::ChannelRange {
                        row: r,
                        col: c,
                        value,
                    });
                }
                grid.cells[r][c] = cell;
            }
        }
        Ok(grid)
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [[Cell; COLS]; ROWS] {
        &mut self.cells
    }

    /// Iterate `(row, col, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &cell)| (r, c, cell)))
    }

    pub fn is_blank(&self) -> bool {
        self.iter().all(|(_, _, cell)| cell == BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(r: usize, c: usize, cell: Cell) -> Vec<Vec<Cell>> {
        vec![vec![cell; c]; r]
    }

    #[test]
    fn test_from_rows_accepts_full_grid() {
        let grid = Grid::from_rows(rows(ROWS, COLS, [0.5, 0.25, 1.0])).unwrap();
        assert_eq!(grid.get(5, 21), [0.5, 0.25, 1.0]);
        assert_eq!(grid, Grid::filled([0.5, 0.25, 1.0]));
    }

    #[test]
    fn test_wrong_row_count() {
        let err = Grid::from_rows(rows(5, COLS, BLACK)).unwrap_err();
        assert_eq!(
            err,
            EffectError::RowCount {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn test_wrong_column_count_reports_row() {
        let mut r = rows(ROWS, COLS, BLACK);
        r[3].pop();
        let err = Grid::from_rows(r).unwrap_err();
        assert_eq!(
            err,
            EffectError::ColumnCount {
                row: 3,
                expected: 22,
                actual: 21
            }
        );
    }

    #[test]
    fn test_out_of_range_channel() {
        let mut r = rows(ROWS, COLS, BLACK);
        r[1][2] = [0.0, 1.5, 0.0];
        assert!(matches!(
            Grid::from_rows(r),
            Err(EffectError::ChannelRange { row: 1, col: 2, .. })
        ));

        let mut r = rows(ROWS, COLS, BLACK);
        r[0][0] = [f64::NAN, 0.0, 0.0];
        assert!(Grid::from_rows(r).is_err());
    }

    #[test]
    fn test_is_blank() {
        let mut grid = Grid::blank();
        assert!(grid.is_blank());
        grid.set(2, 7, [0.1, 0.7, 0.3]);
        assert!(!grid.is_blank());
    }
}
