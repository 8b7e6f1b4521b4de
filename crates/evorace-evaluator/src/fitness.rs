//! Net course progress turned into a fitness value.

use evorace_engine::Point;
use serde::{Deserialize, Serialize};

use crate::curve::ReferenceCurve;

/// Shape of the progress-to-fitness mapping.
///
/// ```text
/// fitness = (max(0, progress(final) − progress(start)) / scale) ^ exponent
/// ```
///
/// An exponent above 1 widens the gap between good and mediocre cars, which sharpens
/// fitness-proportionate selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessParams {
    pub scale: f32,
    pub exponent: f32,
}

impl Default for FitnessParams {
    fn default() -> Self {
        Self {
            scale: 50.0,
            exponent: 2.0,
        }
    }
}

/// Scores cars against one track's reference curve.
#[derive(Debug, Clone)]
pub struct CourseEvaluator {
    curve: ReferenceCurve,
    params: FitnessParams,
}

impl CourseEvaluator {
    #[must_use]
    pub fn new(curve: ReferenceCurve, params: FitnessParams) -> Self {
        Self { curve, params }
    }

    #[must_use]
    pub fn curve(&self) -> &ReferenceCurve {
        &self.curve
    }

    #[must_use]
    pub fn params(&self) -> &FitnessParams {
        &self.params
    }

    /// Net progress from `start` to `current`, clamped at zero.
    #[must_use]
    pub fn net_progress(&self, start: Point, current: Point) -> f32 {
        (self.curve.progress(current) - self.curve.progress(start)).max(0.0)
    }

    /// Fitness of a car that started at `start` and ended at `current`. Never negative.
    #[must_use]
    pub fn evaluate(&self, start: Point, current: Point) -> f32 {
        (self.net_progress(start, current) / self.params.scale).powf(self.params.exponent)
    }
}
