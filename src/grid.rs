use std::fmt;

use crate::error::{ensure_len, Result};
use crate::{GRID_AREA, GRID_SIDE};

// Intensity at or above which a cell is drawn as ink in the text rendering
const INK_THRESHOLD: f64 = 0.25;

/// A 28x28 intensity buffer, stored row-major (`index = row * 28 + col`).
///
/// Every cell holds a value in `[0, 1]`; all constructors and mutators clamp.
#[derive(Clone, PartialEq)]
pub struct Grid {
    cells: [f64; GRID_AREA],
}

impl Grid {
    // Zero-filled grid
    pub fn new() -> Self {
        Grid {
            cells: [0.0; GRID_AREA],
        }
    }

    /// Build a grid from a flat row-major slice of exactly 784 values.
    /// Values are clamped into `[0, 1]`; NaN becomes 0.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        ensure_len("grid transfer", GRID_AREA, values.len())?;
        let mut grid = Grid::new();
        grid.cells
            .iter_mut()
            .zip(values)
            .for_each(|(cell, &value)| *cell = clamp_unit(value));
        Ok(grid)
    }

    pub(crate) fn from_array(mut cells: [f64; GRID_AREA]) -> Self {
        cells.iter_mut().for_each(|cell| *cell = clamp_unit(*cell));
        Grid { cells }
    }

    // Linear index of a cell; callers guarantee row, col < GRID_SIDE
    #[inline]
    pub fn index(row: usize, col: usize) -> usize {
        row * GRID_SIDE + col
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[Grid::index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.cells[Grid::index(row, col)] = clamp_unit(value);
    }

    // Add to a cell, saturating at full intensity
    pub fn accumulate(&mut self, row: usize, col: usize, increment: f64) {
        let cell = &mut self.cells[Grid::index(row, col)];
        *cell = clamp_unit(*cell + increment);
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&x| x == 0.0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.cells.to_vec()
    }

    // Iterate over (row, col, intensity)
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &value)| (i / GRID_SIDE, i % GRID_SIDE, value))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ink = self.cells.iter().filter(|&&x| x > 0.0).count();
        f.debug_struct("Grid").field("inked_cells", &ink).finish()
    }
}

// Text rendering, one line per row
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(GRID_SIDE) {
            let line: String = row
                .iter()
                .map(|&x| if x >= INK_THRESHOLD { 'X' } else { '.' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
