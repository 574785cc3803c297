use serde::{Deserialize, Serialize};

/// Elementwise nonlinearity applied after a layer's affine transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Sigmoid,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    pub fn apply_in_place(self, values: &mut [f64]) {
        values.iter_mut().for_each(|x| *x = self.apply(*x));
    }
}
