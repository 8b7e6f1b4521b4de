//! Fixed-topology feed-forward neural networks evolved by the training crate.
//!
//! A network is described by an ordered list of [`LayerSpec`]s. Every adjacent pair of
//! layers is connected by a [`WeightedLayer`] that owns the weight matrix, the bias vector
//! and the activation applied to the result. Querying a network pushes an input vector
//! through every weighted layer in order:
//!
//! ```text
//! x₀ = inputs
//! xᵢ₊₁ = activationᵢ(Wᵢ · xᵢ + bᵢ)
//! ```
//!
//! The output layer owns no parameters of its own; it only receives the weights and bias
//! of the layer before it.
//!
//! # Parameter Updates
//!
//! Networks never learn by gradient descent. The genetic algorithm replaces parameter
//! buffers wholesale: it reads flattened genes from parent layers, builds new buffers and
//! installs them with [`WeightedLayer::with_weights`] / [`WeightedLayer::with_bias`]. The
//! parents are left untouched, so no two individuals ever share parameter storage.
//!
//! # Example
//!
//! ```
//! use evorace_nn::{Activation, LayerSpec, NeuralNetwork};
//!
//! let mut rng = rand::rng();
//! let network = NeuralNetwork::new(
//!     &[
//!         LayerSpec::new(3, Activation::Relu),
//!         LayerSpec::new(4, Activation::Sigmoid),
//!         LayerSpec::new(2, Activation::None),
//!     ],
//!     &mut rng,
//! )
//! .unwrap();
//!
//! let output = network.query(&[0.2, 0.5, 1.0]).unwrap();
//! assert_eq!(output.len(), 2);
//! assert!(output.iter().all(|v| (0.0..=1.0).contains(v)));
//! ```

pub use self::{activation::*, layer::*, network::*};

mod activation;
mod layer;
mod network;

/// Errors raised while building or querying a [`NeuralNetwork`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("network needs at least 2 layers, got {count}")]
    TooFewLayers { count: usize },
    #[display("layer #{index} has no units")]
    EmptyLayer { index: usize },
    #[display("network expects {expected} inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },
    #[display("expected {expected} weighted layers, got {actual}")]
    LayerCount { expected: usize, actual: usize },
    #[display("parameter shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[display("expected {expected} parameters, got {actual}")]
    ParameterCount { expected: usize, actual: usize },
}
