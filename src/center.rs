// Re-centre a drawn digit the way MNIST images are preprocessed: the bounding
// box of the ink is moved so that its midpoint lands on the middle of the frame.

use tracing::debug;

use crate::grid::Grid;
use crate::{GRID_AREA, GRID_SIDE};

// Cells at or below this intensity are treated as background
pub const INK_EPSILON: f64 = 1e-4;

// Row/column that the bounding box midpoint is moved to
const FRAME_MIDPOINT: isize = (GRID_SIDE as isize - 1) / 2;

/// Inclusive bounding box of the ink in a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl BoundingBox {
    // Floored midpoint as (row, col)
    pub fn midpoint(&self) -> (usize, usize) {
        (
            (self.min_row + self.max_row) / 2,
            (self.min_col + self.max_col) / 2,
        )
    }
}

// Tightest box around every cell above INK_EPSILON, or None for a blank grid
pub fn bounding_box(grid: &Grid) -> Option<BoundingBox> {
    grid.iter()
        .filter(|&(_, _, value)| value > INK_EPSILON)
        .fold(None, |acc, (row, col, _)| {
            Some(match acc {
                None => BoundingBox {
                    min_row: row,
                    max_row: row,
                    min_col: col,
                    max_col: col,
                },
                Some(b) => BoundingBox {
                    min_row: b.min_row.min(row),
                    max_row: b.max_row.max(row),
                    min_col: b.min_col.min(col),
                    max_col: b.max_col.max(col),
                },
            })
        })
}

/// Return a copy of `grid` with its ink centred in the frame.
///
/// A grid with no ink yields an all-zero grid. Because the shift puts the box
/// midpoint exactly on the frame midpoint, centring an already centred grid
/// changes nothing.
pub fn center_digit(grid: &Grid) -> Grid {
    let bounds = match bounding_box(grid) {
        Some(bounds) => bounds,
        None => return Grid::new(),
    };
    let (mid_row, mid_col) = bounds.midpoint();
    let row_shift = FRAME_MIDPOINT - mid_row as isize;
    let col_shift = FRAME_MIDPOINT - mid_col as isize;
    debug!(?bounds, row_shift, col_shift, "centring digit");

    let side = GRID_SIDE as isize;
    let mut centred = [0.0; GRID_AREA];
    for (row, col, value) in grid.iter() {
        let dest_row = row as isize + row_shift;
        let dest_col = col as isize + col_shift;
        if !(0..side).contains(&dest_row) || !(0..side).contains(&dest_col) {
            continue;
        }
        let dest = dest_row * side + dest_col;
        if (0..GRID_AREA as isize).contains(&dest) {
            centred[dest as usize] = value;
        }
    }
    Grid::from_array(centred)
}
