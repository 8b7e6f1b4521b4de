//! Fitness evaluation: how far along the course did a car get?
//!
//! The genetic algorithm needs one scalar per car. This crate derives it from the car's
//! start and final positions measured against the track's reference curve:
//!
//! 1. **Progress** ([`curve`]) - Distance travelled along the reference curve up to the
//!    curve point closest to a position
//! 2. **Fitness** ([`fitness`]) - Net progress (final minus start), clamped at zero and
//!    rescaled non-linearly
//!
//! # Architecture
//!
//! ```text
//! Reference Curve (from the track)
//!     ↓ closest point + arc length
//! Progress (course distance)
//!     ↓ final − start, clamp ≥ 0
//! Net Progress
//!     ↓ (net / scale)^exponent
//! Fitness
//! ```
//!
//! # Why Arc Length
//!
//! Measuring progress along the curve rather than straight-line distance from the start
//! means a car on a closed loop is rewarded for following the course, not for driving
//! away from the start line. Snapping to the closest curve point also keeps the measure
//! stable when a car cuts a corner.
//!
//! # Example
//!
//! ```
//! use evorace_engine::Point;
//! use evorace_evaluator::{curve::ReferenceCurve, fitness::{CourseEvaluator, FitnessParams}};
//!
//! let curve = ReferenceCurve::new(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(200.0, 0.0),
//! ])
//! .unwrap();
//! let evaluator = CourseEvaluator::new(curve, FitnessParams::default());
//!
//! let fitness = evaluator.evaluate(Point::new(0.0, 0.0), Point::new(150.0, 0.0));
//! assert!((fitness - 9.0).abs() < 1e-4);
//! ```
//!
//! # Current Limitations
//!
//! - **Position only**: Time taken is not rewarded, so a slow careful car scores the same
//!   as a fast one that reached the same point
//! - **Single lap**: Progress wraps back to zero when a car crosses the start of a closed
//!   curve, so laps beyond the first are not counted

pub mod curve;
pub mod fitness;

/// Returned when a reference curve is built from no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("reference curve needs at least one point")]
pub struct EmptyCurveError;
