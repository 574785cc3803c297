use tracing::debug;

use crate::center::center_digit;
use crate::error::Result;
use crate::grid::Grid;
use crate::network::{NetworkModel, Probabilities};
use crate::rank::{rank, top_label, RankedGuess};
use crate::N_CLASSES;

/// Everything produced by one classification of a drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    // The centred copy that was fed to the network
    pub centered: Grid,
    pub probabilities: Probabilities,
    pub ranking: [RankedGuess; N_CLASSES],
    pub top: usize,
}

/// Centre the drawing, run the network over it, and rank the outputs.
/// The caller's grid is left untouched.
pub fn predict(model: &NetworkModel, grid: &Grid) -> Result<Prediction> {
    let centered = center_digit(grid);
    let probabilities = model.classify_grid(&centered)?;
    let top = top_label(&probabilities);
    debug!(top, probability = probabilities[top], "classified drawing");
    Ok(Prediction {
        ranking: rank(&probabilities),
        centered,
        probabilities,
        top,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Activation, Layer};
    use crate::GRID_AREA;

    // Output k reads the sum of row 13 of the grid, scaled by k
    fn row_reader() -> NetworkModel {
        let mut weights = vec![0.0; N_CLASSES * GRID_AREA];
        for k in 0..N_CLASSES {
            for col in 0..28 {
                weights[k * GRID_AREA + 13 * 28 + col] = k as f64;
            }
        }
        let layer = Layer::new(weights, GRID_AREA, vec![0.0; N_CLASSES], Activation::Sigmoid).unwrap();
        NetworkModel::new(vec![layer]).unwrap()
    }

    #[test]
    fn test_prediction_uses_centred_grid() {
        let mut grid = Grid::new();
        grid.set(0, 0, 1.0);
        let prediction = predict(&row_reader(), &grid).unwrap();
        // Ink moved from row 0 to row 13, so the highest weight wins
        assert_eq!(prediction.top, 9);
        assert_eq!(prediction.ranking[0].label, 9);
        assert_eq!(prediction.centered.get(13, 13), 1.0);
        // Input is not mutated
        assert_eq!(grid.get(0, 0), 1.0);
    }

    #[test]
    fn test_blank_grid() {
        let prediction = predict(&row_reader(), &Grid::new()).unwrap();
        assert!(prediction.probabilities.iter().all(|p| p == 0.5));
        assert_eq!(prediction.top, 0);
    }
}
