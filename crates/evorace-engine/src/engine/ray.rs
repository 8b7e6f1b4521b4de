use std::f32::consts::{FRAC_PI_2, PI};

use crate::core::{Point, Wall, line_intersection};

/// Nearest wall intersection found by a [`Ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Point,
    pub distance: f32,
}

/// A distance sensor fixed to a car at an angle relative to its heading.
///
/// An offset of 0 points to the car's right, `π/2` straight ahead and `π` to its left.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    angle_offset: f32,
    max_length: f32,
    distance: f32,
}

impl Ray {
    #[must_use]
    pub fn new(angle_offset: f32, max_length: f32) -> Self {
        Self {
            angle_offset,
            max_length,
            distance: max_length,
        }
    }

    /// Creates `max(2, count)` rays spread evenly over the half plane ahead of the car.
    #[must_use]
    pub fn fan(count: usize, max_length: f32) -> Vec<Self> {
        let count = count.max(2);
        #[expect(clippy::cast_precision_loss)]
        let step = PI / (count - 1) as f32;
        (0..count)
            .map(|i| {
                #[expect(clippy::cast_precision_loss)]
                let angle = step * i as f32;
                Self::new(angle, max_length)
            })
            .collect()
    }

    /// Offset from the car's heading, in radians.
    #[must_use]
    pub fn angle_offset(&self) -> f32 {
        self.angle_offset
    }

    #[must_use]
    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    /// Distance measured by the last [`sense`](Self::sense) (max length when nothing was hit).
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Measured distance scaled to `[0, 1]`.
    #[must_use]
    pub fn normalized(&self) -> f32 {
        self.distance / self.max_length
    }

    /// World-space unit direction for a car heading (degrees).
    #[must_use]
    pub fn direction(&self, heading: f32) -> Point {
        Point::from_angle(heading.to_radians() + self.angle_offset - FRAC_PI_2)
    }

    /// World-space segment of the ray for a car pose.
    #[must_use]
    pub fn segment(&self, origin: Point, heading: f32) -> (Point, Point) {
        (origin, origin + self.direction(heading) * self.max_length)
    }

    /// Finds the nearest wall hit by the ray.
    ///
    /// A wall counts when the intersection lies strictly inside the wall (`0 < t < 1`),
    /// strictly ahead of the origin (`u > 0`) and within the ray's length. Parallel and
    /// zero-length walls are never hit.
    pub fn cast<'a, I>(&self, origin: Point, heading: f32, walls: I) -> Option<RayHit>
    where
        I: IntoIterator<Item = &'a Wall>,
    {
        let segment = self.segment(origin, heading);
        walls
            .into_iter()
            .filter_map(|wall| self.cast_to_wall(segment, wall))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Casts the ray and records the measured distance.
    ///
    /// Without a hit the distance falls back to the ray's max length, so
    /// [`normalized`](Self::normalized) stays within `[0, 1]`.
    pub fn sense<'a, I>(&mut self, origin: Point, heading: f32, walls: I) -> Option<RayHit>
    where
        I: IntoIterator<Item = &'a Wall>,
    {
        let hit = self.cast(origin, heading, walls);
        self.distance = hit.map_or(self.max_length, |h| h.distance);
        hit
    }

    fn cast_to_wall(&self, ray: (Point, Point), wall: &Wall) -> Option<RayHit> {
        let (t, u) = line_intersection(wall.segment(), ray)?;
        if t <= 0.0 || t >= 1.0 || u <= 0.0 {
            return None;
        }
        let point = wall.start() + (wall.end() - wall.start()) * t;
        let distance = point.distance(ray.0);
        (distance <= self.max_length).then_some(RayHit { point, distance })
    }
}
