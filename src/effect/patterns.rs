//! Grid generators for the common effect shapes.

use std::str::FromStr;

use chroma_transport::{COLS, ROWS};

use crate::color::Rgb8;
use crate::error::EffectError;
use crate::grid::{Cell, Grid};

/// Which way the palette is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Palette runs along the columns; every row is identical (max 22 colours).
    Vertical,
    /// Palette runs along the rows; every column is identical (max 6 colours).
    Horizontal,
}

/// How the palette is repeated to fill a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveMode {
    /// Colours repeat one after another.
    Alternating,
    /// Colours repeat clumped next to themselves.
    Cluster,
}

impl FromStr for Orientation {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VERTICAL" => Ok(Self::Vertical),
            "HORIZONTAL" => Ok(Self::Horizontal),
            _ => Err(EffectError::UnknownLiteral {
                field: "orientation",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for WaveMode {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALTERNATING" => Ok(Self::Alternating),
            "CLUSTER" => Ok(Self::Cluster),
            _ => Err(EffectError::UnknownLiteral {
                field: "mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Stretch `palette` to `len` entries.
fn fill_line(palette: &[Cell], len: usize, mode: WaveMode) -> Vec<Cell> {
    let mut line = palette.to_vec();
    let mut next = 0;
    while line.len() < len {
        let color = palette[next];
        match mode {
            WaveMode::Alternating => line.push(color),
            WaveMode::Cluster => {
                // Always present: the line starts as a copy of the palette.
                let at = line.iter().position(|c| *c == color).unwrap_or(line.len());
                line.insert(at, color);
            }
        }
        next = (next + 1) % palette.len();
    }
    line
}

/// Build a grid for a wave effect from at least two colours.
pub fn wave_pattern(
    colors: &[Rgb8],
    orientation: Orientation,
    mode: WaveMode,
) -> Result<Grid, EffectError> {
    let max = match orientation {
        Orientation::Vertical => COLS,
        Orientation::Horizontal => ROWS,
    };
    if colors.len() < 2 {
        return Err(EffectError::Palette(format!(
            "expected at least 2 colours, got {}",
            colors.len()
        )));
    }
    if colors.len() > max {
        return Err(EffectError::Palette(format!(
            "expected at most {max} colours, got {}",
            colors.len()
        )));
    }

    let palette: Vec<Cell> = colors.iter().map(|c| c.to_float()).collect();
    let line = fill_line(&palette, max, mode);

    let mut grid = Grid::blank();
    for (r, row) in grid.rows_mut().iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = match orientation {
                Orientation::Vertical => line[c],
                Orientation::Horizontal => line[r],
            };
        }
    }
    Ok(grid)
}

/// Blank grid with a 2×2 seed in the middle, ready for explosion expansion.
pub fn explosion_pattern(color: Rgb8) -> Grid {
    let seed = color.to_float();
    let mut grid = Grid::blank();
    for row in 2..=3 {
        for col in 10..=11 {
            grid.set(row, col, seed);
        }
    }
    grid
}

pub fn solid_pattern(color: Rgb8) -> Grid {
    Grid::filled(color.to_float())
}

/// Blank grid with only `keys` (row, col) lit, for key indicators.
pub fn key_pattern(color: Rgb8, keys: &[[usize; 2]]) -> Result<Grid, EffectError> {
    let lit = color.to_float();
    let mut grid = Grid::blank();
    for &[row, col] in keys {
        if row >= ROWS || col >= COLS {
            return Err(EffectError::KeyOutOfRange { row, col });
        }
        grid.set(row, col, lit);
    }
    Ok(grid)
}
