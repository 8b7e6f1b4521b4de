use std::fmt;

use ndarray::Array1;
use rand::Rng;

use crate::{LayerSpec, NetworkError, WeightedLayer};

/// A fixed-topology feed-forward network.
///
/// The topology (`specs`) never changes after construction. Parameters live in one
/// [`WeightedLayer`] per adjacent pair of layers and are only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    specs: Vec<LayerSpec>,
    weighted_layers: Vec<WeightedLayer>,
}

impl NeuralNetwork {
    /// Creates a network with randomly initialized parameters.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::TooFewLayers`] for fewer than two layers and
    /// [`NetworkError::EmptyLayer`] when a layer has zero units.
    pub fn new<R>(specs: &[LayerSpec], rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        validate_specs(specs)?;
        let weighted_layers = specs
            .windows(2)
            .map(|pair| WeightedLayer::random(&pair[0], pair[1].units, rng))
            .collect();
        Ok(Self {
            specs: specs.to_vec(),
            weighted_layers,
        })
    }

    /// Assembles a network from explicit weighted layers.
    ///
    /// Every layer must match the shape implied by `specs`.
    pub fn from_layers(
        specs: &[LayerSpec],
        weighted_layers: Vec<WeightedLayer>,
    ) -> Result<Self, NetworkError> {
        validate_specs(specs)?;
        if weighted_layers.len() != specs.len() - 1 {
            return Err(NetworkError::LayerCount {
                expected: specs.len() - 1,
                actual: weighted_layers.len(),
            });
        }
        for (pair, layer) in specs.windows(2).zip(&weighted_layers) {
            let expected = (pair[1].units, pair[0].units);
            if layer.weights().dim() != expected {
                return Err(NetworkError::ShapeMismatch {
                    expected,
                    actual: layer.weights().dim(),
                });
            }
        }
        Ok(Self {
            specs: specs.to_vec(),
            weighted_layers,
        })
    }

    /// Returns a network with the same topology and the given parameters.
    pub fn with_weighted_layers(
        &self,
        weighted_layers: Vec<WeightedLayer>,
    ) -> Result<Self, NetworkError> {
        Self::from_layers(&self.specs, weighted_layers)
    }

    #[must_use]
    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    /// All layers but the last, each owning the parameters feeding its successor.
    #[must_use]
    pub fn weighted_layers(&self) -> &[WeightedLayer] {
        &self.weighted_layers
    }

    #[must_use]
    pub fn input_units(&self) -> usize {
        self.specs[0].units
    }

    #[must_use]
    pub fn output_units(&self) -> usize {
        self.specs[self.specs.len() - 1].units
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.weighted_layers
            .iter()
            .map(|l| l.weights().len() + l.bias().len())
            .sum()
    }

    /// Runs `inputs` through the network.
    ///
    /// The result has [`output_units`](Self::output_units) values.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputLength`] when `inputs` does not match the first layer.
    pub fn query(&self, inputs: &[f32]) -> Result<Array1<f32>, NetworkError> {
        if inputs.len() != self.input_units() {
            return Err(NetworkError::InputLength {
                expected: self.input_units(),
                actual: inputs.len(),
            });
        }
        let x = Array1::from_vec(inputs.to_vec());
        Ok(self
            .weighted_layers
            .iter()
            .fold(x, |x, layer| layer.forward(&x)))
    }
}

impl fmt::Display for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "#{}: {} units, {}", i + 1, spec.units, spec.activation)?;
        }
        Ok(())
    }
}

fn validate_specs(specs: &[LayerSpec]) -> Result<(), NetworkError> {
    if specs.len() < 2 {
        return Err(NetworkError::TooFewLayers { count: specs.len() });
    }
    if let Some(index) = specs.iter().position(|s| s.units == 0) {
        return Err(NetworkError::EmptyLayer { index });
    }
    Ok(())
}
