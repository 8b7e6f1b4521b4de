use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Activation applied to the output of a weighted layer.
///
/// Parses from its lowercase name (`"relu"`, `"sigmoid"`, `"softmax"`, `"none"`).
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::FromStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Identity passthrough.
    #[default]
    #[display("none")]
    None,
    #[display("relu")]
    Relu,
    #[display("sigmoid")]
    Sigmoid,
    #[display("softmax")]
    Softmax,
}

impl Activation {
    /// Applies the activation to a whole pre-activation vector.
    #[must_use]
    pub fn apply(self, z: Array1<f32>) -> Array1<f32> {
        match self {
            Self::None => z,
            Self::Relu => z.mapv_into(|v| v.max(0.0)),
            Self::Sigmoid => z.mapv_into(|v| 1.0 / (1.0 + (-v).exp())),
            Self::Softmax => softmax(z),
        }
    }
}

fn softmax(z: Array1<f32>) -> Array1<f32> {
    // shift by the maximum so exp never overflows
    let max = z.fold(f32::NEG_INFINITY, |acc, v| acc.max(*v));
    let exp = z.mapv_into(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
