use serde::{Deserialize, Serialize};

/// A point (or vector) in screen coordinates, with `y` growing downward.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Mul,
    Serialize,
    Deserialize,
)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading` (degrees, counter-clockwise on screen).
    #[must_use]
    pub fn from_heading(heading: f32) -> Self {
        Self::from_angle(heading.to_radians())
    }

    /// Unit vector pointing along `angle` (radians, counter-clockwise on screen).
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), -angle.sin())
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Heading in degrees `[0, 360)` of the direction from `self` to `other`.
    #[must_use]
    pub fn heading_to(self, other: Self) -> f32 {
        let d = other - self;
        (-d.y).atan2(d.x).to_degrees().rem_euclid(360.0)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// Parametric intersection of segment `a` with segment `b`.
///
/// Returns `(t, u)` such that the intersection is `a.0 + t·(a.1 - a.0)` and
/// `b.0 + u·(b.1 - b.0)`. Parallel or degenerate segments have no intersection.
/// The parameters are not range checked: callers decide which part of each line counts.
#[must_use]
pub fn line_intersection(a: (Point, Point), b: (Point, Point)) -> Option<(f32, f32)> {
    let (Point { x: x1, y: y1 }, Point { x: x2, y: y2 }) = a;
    let (Point { x: x3, y: y3 }, Point { x: x4, y: y4 }) = b;

    let denominator = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denominator == 0.0 {
        return None;
    }
    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denominator;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denominator;
    Some((t, u))
}

/// Shortest distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Shortest distance between two segments (zero when they cross).
#[must_use]
pub fn segment_distance(a: (Point, Point), b: (Point, Point)) -> f32 {
    let crossing = line_intersection(a, b)
        .is_some_and(|(t, u)| (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u));
    if crossing {
        return 0.0;
    }
    [
        point_segment_distance(a.0, b.0, b.1),
        point_segment_distance(a.1, b.0, b.1),
        point_segment_distance(b.0, a.0, a.1),
        point_segment_distance(b.1, a.0, a.1),
    ]
    .into_iter()
    .fold(f32::INFINITY, f32::min)
}
