//! Track geometry and car simulation for evolving self-driving cars.
//!
//! - [`core`] - Points, walls and tracks (static, shared read-only by every car)
//! - [`engine`] - Ray sensors, control sources and the car motion model
//!
//! The engine knows nothing about fitness or populations: it moves cars through a track
//! and reports when they crash. Scoring lives in `evorace-evaluator` and evolution in
//! `evorace-training`.

pub use self::{core::*, engine::*};

use evorace_nn::NetworkError;

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CarError {
    #[display("network failed to produce controls: {_0}")]
    #[from]
    Network(NetworkError),
    #[display("network produces {actual} outputs, steering and engine need 2")]
    OutputCount { actual: usize },
}
