use super::{
    geometry::Point,
    wall::{Wall, walls_along},
};

/// Default thickness of the wall strokes cars collide with.
pub const DEFAULT_WALL_THICKNESS: f32 = 15.0;

/// Static geometry of one race: reference curve, walls and start pose.
///
/// Tracks are built by an external generator; the engine only reads them.
#[derive(Debug, Clone)]
pub struct Track {
    curve: Vec<Point>,
    walls: Vec<Wall>,
    start: Point,
    start_heading: f32,
    wall_thickness: f32,
}

impl Track {
    #[must_use]
    pub fn new(curve: Vec<Point>, walls: Vec<Wall>, start: Point, start_heading: f32) -> Self {
        Self {
            curve,
            walls,
            start,
            start_heading: start_heading.rem_euclid(360.0),
            wall_thickness: DEFAULT_WALL_THICKNESS,
        }
    }

    /// Builds a track from its central curve and the two boundary curves.
    ///
    /// Each boundary becomes a chain of walls. A `closed` track also connects the last
    /// point of each boundary to its first; an open one instead caps both ends with a
    /// wall from the inner to the outer boundary. The start heading follows the central
    /// curve at the point closest to `start`.
    #[must_use]
    pub fn from_curves(
        central: Vec<Point>,
        inner: &[Point],
        outer: &[Point],
        start: Point,
        closed: bool,
    ) -> Self {
        let mut walls = walls_along(inner, closed);
        walls.extend(walls_along(outer, closed));
        if !closed {
            if let (Some(&i0), Some(&o0)) = (inner.first(), outer.first()) {
                walls.push(Wall::new(i0, o0));
            }
            if let (Some(&i1), Some(&o1)) = (inner.last(), outer.last()) {
                walls.push(Wall::new(i1, o1));
            }
        }
        let start_heading = heading_along(&central, start);
        Self::new(central, walls, start, start_heading)
    }

    #[must_use]
    pub fn with_wall_thickness(mut self, thickness: f32) -> Self {
        self.wall_thickness = thickness;
        self
    }

    /// Reference curve used to measure progress.
    #[must_use]
    pub fn curve(&self) -> &[Point] {
        &self.curve
    }

    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    /// Heading in degrees cars spawn with.
    #[must_use]
    pub fn start_heading(&self) -> f32 {
        self.start_heading
    }

    #[must_use]
    pub fn wall_thickness(&self) -> f32 {
        self.wall_thickness
    }

    /// Walls with any part closer than `radius` to `point`.
    pub fn walls_near(&self, point: Point, radius: f32) -> impl Iterator<Item = &Wall> + '_ {
        self.walls
            .iter()
            .filter(move |w| w.distance_to(point) <= radius)
    }
}

fn heading_along(curve: &[Point], point: Point) -> f32 {
    if curve.len() < 2 {
        return 0.0;
    }
    let index = curve
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance(point).total_cmp(&b.distance(point)))
        .map_or(0, |(i, _)| i);
    let next = (index + 1) % curve.len();
    curve[index].heading_to(curve[next])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(closed: bool) -> Track {
        let central = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(200.0, 0.0),
        ];
        let inner = [
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            Point::new(200.0, 50.0),
        ];
        let outer = [
            Point::new(0.0, -50.0),
            Point::new(100.0, -50.0),
            Point::new(200.0, -50.0),
        ];
        Track::from_curves(central, &inner, &outer, Point::new(10.0, 0.0), closed)
    }

    #[test]
    fn test_open_track_is_capped() {
        let track = corridor(false);
        // 2 + 2 boundary walls, 2 caps
        assert_eq!(track.walls().len(), 6);
        assert!(track.start_heading().abs() < 1e-4);
        assert!((track.wall_thickness() - DEFAULT_WALL_THICKNESS).abs() < f32::EPSILON);
    }

    #[test]
    fn test_closed_track_loops_boundaries() {
        let track = corridor(true);
        assert_eq!(track.walls().len(), 6);
        assert!(
            track
                .walls()
                .contains(&Wall::new(Point::new(200.0, 50.0), Point::new(0.0, 50.0)))
        );
    }

    #[test]
    fn test_walls_near() {
        let track = corridor(false);
        let near: Vec<_> = track.walls_near(Point::new(150.0, 0.0), 60.0).collect();
        // the two boundary segments beside the point plus the far cap at x = 200
        assert_eq!(near.len(), 3);
        assert_eq!(track.walls_near(Point::new(150.0, 0.0), 10.0).count(), 0);
    }
}
