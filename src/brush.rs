use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::{GRID_AREA, GRID_SIDE};

/// Brush parameters.
///
/// - `strength` scales the intensity added at the stroke centre; strokes only ever add ink,
///   so a brush with no positive strength draws nothing
/// - `radius` is the falloff distance in grid cells; nothing is drawn when it is not positive
/// - `fade` is the falloff exponent: 1 is linear, above 1 concentrates ink near the centre
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub strength: f64,
    pub radius: f64,
    pub fade: f64,
}

impl Brush {
    pub fn new(strength: f64, radius: f64, fade: f64) -> Self {
        Brush {
            strength,
            radius,
            fade,
        }
    }

    // A brush that can never touch a cell
    pub fn is_inert(&self) -> bool {
        !(self.radius > 0.0)
            || !(self.strength > 0.0)
            || !self.radius.is_finite()
            || !self.strength.is_finite()
            || !self.fade.is_finite()
    }

    // Intensity added to a cell `distance` grid units from the centre, if it is in reach
    #[inline]
    pub fn falloff(&self, distance: f64) -> Option<f64> {
        if self.is_inert() || distance >= self.radius {
            return None;
        }
        Some(self.strength * ((self.radius - distance) / self.radius).powf(self.fade))
    }
}

impl Default for Brush {
    fn default() -> Self {
        Brush::new(0.5, 1.5, 1.0)
    }
}

/// Maps pointer positions on a square canvas onto the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rasterizer {
    canvas_size: f64,
}

impl Rasterizer {
    pub fn new(canvas_size: f64) -> Self {
        Rasterizer { canvas_size }
    }

    pub fn canvas_size(&self) -> f64 {
        self.canvas_size
    }

    pub fn cell_size(&self) -> f64 {
        self.canvas_size / GRID_SIDE as f64
    }

    // Grid cell (row, col) under a pointer position, if the pointer is over the canvas
    pub fn cell_at(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let cell_size = self.cell_size();
        if !(cell_size > 0.0) {
            return None;
        }
        let col = (x / cell_size).floor();
        let row = (y / cell_size).floor();
        let in_range = |v: f64| v >= 0.0 && v < GRID_SIDE as f64;
        if in_range(row) && in_range(col) {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }

    /// Apply one stroke sample at canvas position `(x, y)`.
    /// Returns the number of cells that received ink.
    pub fn apply_stroke(&self, grid: &mut Grid, x: f64, y: f64, brush: &Brush) -> usize {
        match self.cell_at(x, y) {
            Some((row, col)) => stamp(grid, row, col, brush),
            None => 0,
        }
    }
}

/// Stamp the brush centred on grid cell `(row, col)`.
///
/// Breadth-first fill outward in the four axis directions. A cell is inked (and
/// its neighbours explored) only while its distance to the centre is below the
/// brush radius. Each cell is visited at most once per stamp.
pub fn stamp(grid: &mut Grid, row: usize, col: usize, brush: &Brush) -> usize {
    if brush.is_inert() || row >= GRID_SIDE || col >= GRID_SIDE {
        return 0;
    }

    let mut visited = [false; GRID_AREA];
    let mut queue = VecDeque::new();
    visited[Grid::index(row, col)] = true;
    queue.push_back((row, col));

    let mut inked = 0;
    while let Some((r, c)) = queue.pop_front() {
        let dr = r as f64 - row as f64;
        let dc = c as f64 - col as f64;
        let increment = match brush.falloff((dr * dr + dc * dc).sqrt()) {
            Some(increment) => increment,
            None => continue,
        };
        grid.accumulate(r, c, increment);
        inked += 1;

        let neighbours = [
            (r.checked_sub(1), Some(c)),
            (Some(r + 1), Some(c)),
            (Some(r), c.checked_sub(1)),
            (Some(r), Some(c + 1)),
        ];
        for (nr, nc) in neighbours {
            if let (Some(nr), Some(nc)) = (nr, nc) {
                if nr < GRID_SIDE && nc < GRID_SIDE && !visited[Grid::index(nr, nc)] {
                    visited[Grid::index(nr, nc)] = true;
                    queue.push_back((nr, nc));
                }
            }
        }
    }
    inked
}
