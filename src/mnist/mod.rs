// Labelled digit datasets and model evaluation over them

use crate::grid::Grid;

mod load_csv;
pub use load_csv::load_mnist_csv;

mod load_idx;
pub use load_idx::load_mnist_idx;

mod evaluate;
pub use evaluate::{evaluate, Evaluation};

/// One labelled image.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub grid: Grid,
    pub label: usize,
}

// Raw pixel bytes are scaled into [0, 1]
const PIXEL_MAX: f64 = 255.0;
