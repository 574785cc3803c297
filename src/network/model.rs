use std::ops::Index;

use tracing::{debug, warn};

use crate::error::{ensure_len, Error, Result};
use crate::grid::Grid;
use crate::{GRID_AREA, N_CLASSES};

use super::{Activation, Layer};

/// Per-class sigmoid outputs, indexed by digit label.
///
/// Each value is in `[0, 1]`, but the vector is not normalised: the outputs
/// are independent sigmoids, so they need not sum to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probabilities([f64; N_CLASSES]);

impl Probabilities {
    pub fn new(values: [f64; N_CLASSES]) -> Self {
        Probabilities(values)
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        ensure_len("classification output", N_CLASSES, values.len())?;
        array_init::from_iter(values.iter().copied())
            .map(Probabilities)
            .ok_or_else(|| Error::shape("classification output", N_CLASSES, values.len()))
    }

    pub fn as_array(&self) -> &[f64; N_CLASSES] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl Index<usize> for Probabilities {
    type Output = f64;

    fn index(&self, label: usize) -> &f64 {
        &self.0[label]
    }
}

/// A fixed, pre-trained network: 784 inputs, any number of hidden layers, 10 outputs.
///
/// The model is immutable once built and can be shared freely between threads;
/// every call to [`NetworkModel::classify`] is an independent forward pass.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkModel {
    layers: Vec<Layer>,
}

impl NetworkModel {
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        let first = layers.first().ok_or(Error::EmptyModel)?;
        ensure_len("first layer inputs", GRID_AREA, first.inputs())?;
        for pair in layers.windows(2) {
            ensure_len("layer chaining", pair[0].outputs(), pair[1].inputs())?;
        }
        let last = layers.last().ok_or(Error::EmptyModel)?;
        ensure_len("output layer units", N_CLASSES, last.outputs())?;

        if last.activation() != Activation::Sigmoid {
            warn!(
                activation = ?last.activation(),
                "output layer is not tagged sigmoid; sigmoid will be used"
            );
        }
        Ok(NetworkModel { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    // Layer widths, input first
    pub fn sizes(&self) -> Vec<usize> {
        std::iter::once(GRID_AREA)
            .chain(self.layers.iter().map(Layer::outputs))
            .collect()
    }

    /// Run one forward pass over a flat 784-value input.
    ///
    /// Hidden layers use their own activation. The output layer always uses
    /// sigmoid, whatever it is tagged with.
    pub fn classify(&self, input: &[f64]) -> Result<Probabilities> {
        ensure_len("network input", GRID_AREA, input.len())?;
        let last = self.layers.len() - 1;
        let mut activations = input.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            let activation = if i == last {
                Activation::Sigmoid
            } else {
                layer.activation()
            };
            activations = layer.forward(&activations, activation)?;
            debug!(layer = i, units = activations.len(), "propagated layer");
        }
        Probabilities::from_slice(&activations)
    }

    pub fn classify_grid(&self, grid: &Grid) -> Result<Probabilities> {
        self.classify(grid.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_model(bias: [f64; N_CLASSES]) -> NetworkModel {
        let layer = Layer::new(
            vec![0.0; N_CLASSES * GRID_AREA],
            GRID_AREA,
            bias.to_vec(),
            Activation::Sigmoid,
        )
        .unwrap();
        NetworkModel::new(vec![layer]).unwrap()
    }

    #[test]
    fn test_zero_weights_give_sigmoid_of_bias() {
        let bias = [-3.0, -2.0, -1.0, 0.0, 0.5, 1.0, 2.0, 3.0, 4.0, -0.5];
        let model = constant_model(bias);
        for input in [vec![0.0; GRID_AREA], vec![1.0; GRID_AREA]] {
            let p = model.classify(&input).unwrap();
            for (label, &b) in bias.iter().enumerate() {
                assert!((p[label] - 1.0 / (1.0 + (-b).exp())).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_input_length_checked() {
        let model = constant_model([0.0; N_CLASSES]);
        for len in [783, 785] {
            assert!(matches!(
                model.classify(&vec![0.0; len]),
                Err(Error::ShapeMismatch {
                    expected: 784,
                    actual,
                    ..
                }) if actual == len
            ));
        }
    }

    #[test]
    fn test_output_layer_forced_to_sigmoid() {
        // A ReLU-tagged output layer with negative bias would otherwise give 0
        let hidden = Layer::new(vec![0.0; 4 * GRID_AREA], GRID_AREA, vec![1.0; 4], Activation::Relu)
            .unwrap();
        let output = Layer::new(vec![0.0; N_CLASSES * 4], 4, vec![-1.0; N_CLASSES], Activation::Relu)
            .unwrap();
        let model = NetworkModel::new(vec![hidden, output]).unwrap();
        let p = model.classify(&[0.5; GRID_AREA]).unwrap();
        let expected = 1.0 / (1.0 + 1f64.exp());
        assert!(p.iter().all(|x| (x - expected).abs() < 1e-12));
    }

    #[test]
    fn test_hidden_activation_applied() {
        // Hidden unit sums the input; output unit 0 reads it with weight 1
        let hidden = Layer::new(vec![-1.0; GRID_AREA], GRID_AREA, vec![0.0], Activation::Relu).unwrap();
        let mut weights = vec![0.0; N_CLASSES];
        weights[0] = 1.0;
        let output = Layer::new(weights, 1, vec![0.0; N_CLASSES], Activation::Sigmoid).unwrap();
        let model = NetworkModel::new(vec![hidden, output]).unwrap();
        // ReLU clips the negative hidden value to zero
        let p = model.classify(&[1.0; GRID_AREA]).unwrap();
        assert_eq!(p[0], 0.5);
        assert_eq!(model.sizes(), vec![784, 1, 10]);
    }

    #[test]
    fn test_shape_validation() {
        assert!(matches!(NetworkModel::new(vec![]), Err(Error::EmptyModel)));

        let wrong_input = Layer::new(vec![0.0; 10 * 5], 5, vec![0.0; 10], Activation::Sigmoid).unwrap();
        assert!(NetworkModel::new(vec![wrong_input]).is_err());

        let a = Layer::new(vec![0.0; 3 * GRID_AREA], GRID_AREA, vec![0.0; 3], Activation::Relu).unwrap();
        let b = Layer::new(vec![0.0; 10 * 4], 4, vec![0.0; 10], Activation::Sigmoid).unwrap();
        assert!(matches!(
            NetworkModel::new(vec![a.clone(), b]),
            Err(Error::ShapeMismatch {
                expected: 3,
                actual: 4,
                ..
            })
        ));

        let short = Layer::new(vec![0.0; 9 * 3], 3, vec![0.0; 9], Activation::Sigmoid).unwrap();
        assert!(NetworkModel::new(vec![a, short]).is_err());
    }

    #[test]
    fn test_probabilities_from_slice() {
        assert!(Probabilities::from_slice(&[0.1; 9]).is_err());
        let p = Probabilities::from_slice(&[0.2; 10]).unwrap();
        assert_eq!(p.as_array().len(), 10);
    }
}
