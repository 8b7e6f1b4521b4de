//! Progress along a reference curve.
//!
//! A [`ReferenceCurve`] is the ordered polyline a track is built around. The progress of
//! a position is the course distance up to the curve point closest to it:
//!
//! ```text
//! i        = closest_index(p)
//! progress = arc_length(curve[0..i-1]) + |p − curve[i-1]|     (0 when i = 0)
//! ```
//!
//! # Tie-Break
//!
//! The closest point is found by a linear scan that replaces the current best on `<=`.
//! When several curve points are equally close, the **later** one wins. Near a symmetric
//! pair of points this picks the one further along the course, which is also the choice
//! that keeps progress monotonic as a car drives forward along a straight segment.

use evorace_engine::Point;

use crate::EmptyCurveError;

/// Ordered curve points with precomputed cumulative arc lengths.
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    points: Vec<Point>,
    /// `arc_lengths[i]` is the polyline length from `points[0]` to `points[i]`
    arc_lengths: Vec<f32>,
}

impl ReferenceCurve {
    /// Builds a curve from at least one point.
    pub fn new(points: Vec<Point>) -> Result<Self, EmptyCurveError> {
        if points.is_empty() {
            return Err(EmptyCurveError);
        }
        let mut arc_lengths = Vec::with_capacity(points.len());
        let mut total = 0.0;
        arc_lengths.push(total);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            arc_lengths.push(total);
        }
        Ok(Self {
            points,
            arc_lengths,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Polyline length from the first to the last point.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.arc_lengths[self.arc_lengths.len() - 1]
    }

    /// Index of the curve point closest to `point` (later index on ties).
    #[must_use]
    pub fn closest_index(&self, point: Point) -> usize {
        let mut best_index = 0;
        let mut best_distance = f32::INFINITY;
        for (i, p) in self.points.iter().enumerate() {
            let distance = p.distance(point);
            if distance <= best_distance {
                best_index = i;
                best_distance = distance;
            }
        }
        best_index
    }

    /// Course distance travelled to reach `point`.
    #[must_use]
    pub fn progress(&self, point: Point) -> f32 {
        match self.closest_index(point) {
            0 => 0.0,
            i => self.arc_lengths[i - 1] + point.distance(self.points[i - 1]),
        }
    }
}
