//! Crossover between two networks of the same topology.
//!
//! Each weighted layer is crossed independently, and within a layer the weight matrix and
//! the bias vector are crossed separately (single-point crossover picks an independent cut
//! for each). Children are assembled from fresh buffers via
//! [`NeuralNetwork::with_weighted_layers`]; the parents are never modified.

use evorace_nn::{NetworkError, NeuralNetwork, WeightedLayer};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::genes;

/// Crossover strategy.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Crossover {
    /// Prefix of one parent, suffix of the other.
    #[default]
    #[display("single-point")]
    SinglePoint,
    /// Independent fair coin per gene.
    #[display("uniform")]
    Uniform,
}

/// Parents that cannot be crossed.
#[derive(
    Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum CrossoverError {
    #[display("parents have {left} and {right} weighted layers")]
    LayerCount { left: usize, right: usize },
    #[display("weighted layer #{layer} has shape {left:?} in one parent and {right:?} in the other")]
    ShapeMismatch {
        layer: usize,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[display("failed to assemble child network: {_0}")]
    #[from]
    Network(NetworkError),
}

impl Crossover {
    /// Crosses two parents into two children.
    ///
    /// The first child keeps the topology of `a` and the second that of `b`.
    ///
    /// # Errors
    ///
    /// Returns [`CrossoverError::LayerCount`] or [`CrossoverError::ShapeMismatch`] when
    /// the parents' parameters do not line up. Nothing is built in that case.
    pub fn cross<R>(
        self,
        a: &NeuralNetwork,
        b: &NeuralNetwork,
        rng: &mut R,
    ) -> Result<(NeuralNetwork, NeuralNetwork), CrossoverError>
    where
        R: Rng + ?Sized,
    {
        check_compatible(a, b)?;

        let mut layers_a = Vec::with_capacity(a.weighted_layers().len());
        let mut layers_b = Vec::with_capacity(b.weighted_layers().len());
        for (la, lb) in a.weighted_layers().iter().zip(b.weighted_layers()) {
            let (wa, wb) = self.cross_genes(&flat_weights(la), &flat_weights(lb), rng);
            let (ba, bb) = self.cross_genes(&flat_bias(la), &flat_bias(lb), rng);
            layers_a.push(la.with_weights(wa)?.with_bias(ba)?);
            layers_b.push(lb.with_weights(wb)?.with_bias(bb)?);
        }
        Ok((
            a.with_weighted_layers(layers_a)?,
            b.with_weighted_layers(layers_b)?,
        ))
    }

    fn cross_genes<R>(self, a: &[f32], b: &[f32], rng: &mut R) -> (Vec<f32>, Vec<f32>)
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::SinglePoint => genes::single_point(a, b, rng),
            Self::Uniform => genes::uniform(a, b, rng),
        }
    }
}

fn check_compatible(a: &NeuralNetwork, b: &NeuralNetwork) -> Result<(), CrossoverError> {
    let (left, right) = (a.weighted_layers(), b.weighted_layers());
    if left.len() != right.len() {
        return Err(CrossoverError::LayerCount {
            left: left.len(),
            right: right.len(),
        });
    }
    for (layer, (la, lb)) in left.iter().zip(right).enumerate() {
        if la.weights().dim() != lb.weights().dim() {
            return Err(CrossoverError::ShapeMismatch {
                layer,
                left: la.weights().dim(),
                right: lb.weights().dim(),
            });
        }
    }
    Ok(())
}

pub(crate) fn flat_weights(layer: &WeightedLayer) -> Vec<f32> {
    layer.weights().iter().copied().collect()
}

fn flat_bias(layer: &WeightedLayer) -> Vec<f32> {
    layer.bias().iter().copied().collect()
}
