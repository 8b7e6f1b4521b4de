use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::{Activation, NetworkError};

/// Topology description of one network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Number of neurons on this layer
    pub units: usize,
    /// Activation applied to the values this layer feeds into the next one
    #[serde(default)]
    pub activation: Activation,
}

impl LayerSpec {
    #[must_use]
    pub const fn new(units: usize, activation: Activation) -> Self {
        Self { units, activation }
    }
}

/// Parameters connecting a layer to the next one.
///
/// `weights` has shape `[next_units, units]` and `bias` has length `next_units`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedLayer {
    activation: Activation,
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl WeightedLayer {
    /// Builds a layer from explicit parameters.
    pub fn new(
        activation: Activation,
        weights: Array2<f32>,
        bias: Array1<f32>,
    ) -> Result<Self, NetworkError> {
        if bias.len() != weights.nrows() {
            return Err(NetworkError::ShapeMismatch {
                expected: (weights.nrows(), 1),
                actual: (bias.len(), 1),
            });
        }
        Ok(Self {
            activation,
            weights,
            bias,
        })
    }

    /// Creates randomly initialized parameters connecting `spec` to a layer of `next_units`.
    ///
    /// Weights are drawn from `N(0, units^-0.5)` (fan-in scaling), biases uniformly
    /// from `[0, 1)`. Callers validate that `spec.units` is non-zero.
    pub(crate) fn random<R>(spec: &LayerSpec, next_units: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        #[expect(clippy::cast_precision_loss)]
        let std_dev = (spec.units as f32).powf(-0.5);
        let normal = Normal::new(0.0, std_dev).expect("fan-in standard deviation is positive");
        let weights = Array2::from_shape_fn((next_units, spec.units), |_| rng.sample(normal));
        let bias = Array1::from_shape_fn(next_units, |_| rng.random::<f32>());
        Self {
            activation: spec.activation,
            weights,
            bias,
        }
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> &Array1<f32> {
        &self.bias
    }

    /// Number of values this layer consumes.
    #[must_use]
    pub fn input_units(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of values this layer produces.
    #[must_use]
    pub fn output_units(&self) -> usize {
        self.weights.nrows()
    }

    /// Computes `activation(W · x + b)`.
    #[must_use]
    pub fn forward(&self, x: &Array1<f32>) -> Array1<f32> {
        let z = self.weights.dot(x) + &self.bias;
        self.activation.apply(z)
    }

    /// Returns a copy of this layer whose weights are replaced by `genes`.
    ///
    /// `genes` is the row-major flattening of the new weight matrix and must have exactly
    /// as many values as the current one.
    pub fn with_weights(&self, genes: Vec<f32>) -> Result<Self, NetworkError> {
        let expected = self.weights.len();
        let actual = genes.len();
        let weights = Array2::from_shape_vec(self.weights.dim(), genes)
            .map_err(|_| NetworkError::ParameterCount { expected, actual })?;
        Ok(Self {
            activation: self.activation,
            weights,
            bias: self.bias.clone(),
        })
    }

    /// Returns a copy of this layer whose bias is replaced by `genes`.
    pub fn with_bias(&self, genes: Vec<f32>) -> Result<Self, NetworkError> {
        if genes.len() != self.bias.len() {
            return Err(NetworkError::ParameterCount {
                expected: self.bias.len(),
                actual: genes.len(),
            });
        }
        Ok(Self {
            activation: self.activation,
            weights: self.weights.clone(),
            bias: Array1::from_vec(genes),
        })
    }
}
