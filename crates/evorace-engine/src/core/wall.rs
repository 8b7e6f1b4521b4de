use serde::{Deserialize, Serialize};

use super::geometry::{Point, point_segment_distance};

/// An immutable track boundary segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    start: Point,
    end: Point,
}

impl Wall {
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Point {
        self.end
    }

    #[must_use]
    pub fn segment(&self) -> (Point, Point) {
        (self.start, self.end)
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Shortest distance from `point` to any part of the wall.
    #[must_use]
    pub fn distance_to(&self, point: Point) -> f32 {
        point_segment_distance(point, self.start, self.end)
    }
}

/// Connects consecutive points of `curve` with walls.
///
/// With `closed`, the last point is also connected back to the first.
#[must_use]
pub fn walls_along(curve: &[Point], closed: bool) -> Vec<Wall> {
    let mut walls: Vec<Wall> = curve.windows(2).map(|w| Wall::new(w[0], w[1])).collect();
    if closed && curve.len() > 2 {
        walls.push(Wall::new(curve[curve.len() - 1], curve[0]));
    }
    walls
}
