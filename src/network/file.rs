use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ensure_len, Result};
use crate::linalg::transpose_columns;

use super::{Activation, Layer, NetworkModel};

/// On-disk JSON form of a model.
///
/// `weights[i]` holds one list per *input* unit of layer `i` (column-major),
/// so `weights[i][col][row]` is the weight from input `col` to output `row`.
/// The output layer is always evaluated with sigmoid. Hidden layers take
/// their tag from `activations` (one entry per layer) when present, and fall
/// back to `hidden_activation` otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub weights: Vec<Vec<Vec<f64>>>,
    pub biases: Vec<Vec<f64>>,
    #[serde(default)]
    pub hidden_activation: Activation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activations: Option<Vec<Activation>>,
}

impl ModelFile {
    pub fn into_model(self) -> Result<NetworkModel> {
        ensure_len("model file biases", self.weights.len(), self.biases.len())?;
        if let Some(activations) = &self.activations {
            ensure_len("model file activations", self.weights.len(), activations.len())?;
        }
        let last = self.weights.len().saturating_sub(1);
        let layers = self
            .weights
            .iter()
            .zip(self.biases)
            .enumerate()
            .map(|(i, (columns, bias))| -> Result<Layer> {
                let activation = match &self.activations {
                    _ if i == last => Activation::Sigmoid,
                    Some(activations) => activations[i],
                    None => self.hidden_activation,
                };
                let weights = transpose_columns(columns, bias.len())?;
                Layer::new(weights, columns.len(), bias, activation)
            })
            .collect::<Result<Vec<_>>>()?;
        NetworkModel::new(layers)
    }

    pub fn from_model(model: &NetworkModel) -> Self {
        let weights: Vec<Vec<Vec<f64>>> = model
            .layers()
            .iter()
            .map(|layer| {
                (0..layer.inputs())
                    .map(|col| (0..layer.outputs()).map(|row| layer.weight(row, col)).collect::<Vec<f64>>())
                    .collect()
            })
            .collect();
        let biases = model.layers().iter().map(|l| l.bias().to_vec()).collect();
        // Hidden activation of a single-layer model is irrelevant
        let hidden_activation = match model.layers() {
            [first, _, ..] => first.activation(),
            _ => Activation::default(),
        };
        let activations = model.layers().iter().map(|l| l.activation()).collect();
        ModelFile {
            weights,
            biases,
            hidden_activation,
            activations: Some(activations),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<NetworkModel> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let file: ModelFile = serde_json::from_reader(reader)?;
        let model = file.into_model()?;
        info!(path = %path.display(), sizes = ?model.sizes(), "loaded model");
        Ok(model)
    }

    pub fn save(model: &NetworkModel, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &ModelFile::from_model(model))?;
        info!(path = %path.display(), "saved model");
        Ok(())
    }
}
