use rand::Rng;
use rand_distr::StandardNormal;
use tracing::info;

use crate::error::Result;
use crate::{GRID_AREA, N_CLASSES};

use super::{Activation, Layer, NetworkModel};

/// Random weight schemes for building untrained models (demo models, tests).
/// Biases always start at zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Initializer {
    // N(mean, std_dev^2) for every weight
    Gaussian { mean: f64, std_dev: f64 },
    // N(0, 2 / fan_in)
    He,
}

impl Initializer {
    pub fn weight(&self, fan_in: usize, rng: &mut impl Rng) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        match *self {
            Initializer::Gaussian { mean, std_dev } => z * std_dev + mean,
            Initializer::He => z * (2.0 / fan_in.max(1) as f64).sqrt(),
        }
    }

    /// Build a 784 -> hidden... -> 10 model with random weights.
    pub fn build_model(
        &self,
        hidden_sizes: &[usize],
        hidden_activation: Activation,
        rng: &mut impl Rng,
    ) -> Result<NetworkModel> {
        let sizes: Vec<usize> = std::iter::once(GRID_AREA)
            .chain(hidden_sizes.iter().copied())
            .chain(std::iter::once(N_CLASSES))
            .collect();

        let last = sizes.len() - 2;
        let layers = sizes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let (inputs, outputs) = (pair[0], pair[1]);
                let weights = (0..inputs * outputs)
                    .map(|_| self.weight(inputs, rng))
                    .collect();
                let activation = if i == last {
                    Activation::Sigmoid
                } else {
                    hidden_activation
                };
                Layer::new(weights, inputs, vec![0.0; outputs], activation)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(?sizes, initializer = ?self, "initialized random model");
        NetworkModel::new(layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_build_model_shapes() {
        let mut rng = SmallRng::seed_from_u64(0);
        let model = Initializer::He
            .build_model(&[64, 32], Activation::Relu, &mut rng)
            .unwrap();
        assert_eq!(model.sizes(), vec![784, 64, 32, 10]);
        assert_eq!(model.layers()[0].activation(), Activation::Relu);
        assert_eq!(model.layers()[2].activation(), Activation::Sigmoid);
        assert!(model.layers().iter().all(|l| l.bias().iter().all(|&b| b == 0.0)));
    }

    #[test]
    fn test_no_hidden_layers() {
        let mut rng = SmallRng::seed_from_u64(1);
        let model = Initializer::Gaussian {
            mean: 0.0,
            std_dev: 0.01,
        }
        .build_model(&[], Activation::Relu, &mut rng)
        .unwrap();
        assert_eq!(model.sizes(), vec![784, 10]);
    }

    #[test]
    fn test_gaussian_zero_std_is_constant() {
        let mut rng = SmallRng::seed_from_u64(2);
        let init = Initializer::Gaussian {
            mean: 0.25,
            std_dev: 0.0,
        };
        assert!((0..100).all(|_| init.weight(10, &mut rng) == 0.25));
    }

    #[test]
    fn test_he_scale() {
        let mut rng = SmallRng::seed_from_u64(3);
        let n = 20_000;
        let fan_in = 50;
        let var: f64 = (0..n)
            .map(|_| Initializer::He.weight(fan_in, &mut rng).powi(2))
            .sum::<f64>()
            / n as f64;
        assert!((var - 2.0 / fan_in as f64).abs() < 0.005);
    }
}
