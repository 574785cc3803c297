pub mod error;
pub mod grid;
pub mod brush;
pub mod center;
pub mod linalg;
pub mod network;
pub mod rank;
pub mod pipeline;
pub mod session;
pub mod mnist;

pub use error::{Error, Result};
pub use grid::Grid;
pub use brush::{Brush, Rasterizer};
pub use center::center_digit;
pub use network::{Activation, Layer, NetworkModel, Probabilities};
pub use rank::{rank, top_label, RankedGuess};
pub use pipeline::{predict, Prediction};
pub use session::{DrawingSession, SessionConfig};

// Side length of the square input image
pub const GRID_SIDE: usize = 28;
// Number of network inputs
pub const GRID_AREA: usize = GRID_SIDE * GRID_SIDE;
// Digit classes 0-9
pub const N_CLASSES: usize = 10;
