use crate::error::{ensure_len, Result};
use crate::linalg;

use super::Activation;

/// One fully connected layer: `activation(W * x + b)`.
///
/// `W` is stored row-major with one row per output unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    weights: Vec<f64>,
    bias: Vec<f64>,
    inputs: usize,
    activation: Activation,
}

impl Layer {
    // Row-major weights of shape (bias.len(), inputs)
    pub fn new(weights: Vec<f64>, inputs: usize, bias: Vec<f64>, activation: Activation) -> Result<Self> {
        ensure_len("layer weights", bias.len() * inputs, weights.len())?;
        Ok(Layer {
            weights,
            bias,
            inputs,
            activation,
        })
    }

    // Build from one weight row per output unit
    pub fn from_rows(rows: &[Vec<f64>], bias: Vec<f64>, activation: Activation) -> Result<Self> {
        ensure_len("layer weight rows", bias.len(), rows.len())?;
        let inputs = rows.first().map_or(0, Vec::len);
        let mut weights = Vec::with_capacity(rows.len() * inputs);
        for row in rows {
            ensure_len("layer weight row", inputs, row.len())?;
            weights.extend_from_slice(row);
        }
        Layer::new(weights, inputs, bias, activation)
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.bias.len()
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    // Weight from input unit `col` to output unit `row`
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights[row * self.inputs + col]
    }

    /// Propagate `input` through the layer using `activation`, which the model
    /// may override for the output layer.
    pub fn forward(&self, input: &[f64], activation: Activation) -> Result<Vec<f64>> {
        let mut output = linalg::mat_vec(&self.weights, self.outputs(), self.inputs, input)?;
        linalg::add_assign(&mut output, &self.bias)?;
        activation.apply_in_place(&mut output);
        Ok(output)
    }
}
