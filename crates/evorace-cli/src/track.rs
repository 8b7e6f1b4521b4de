use std::f32::consts::TAU;

use evorace_engine::{Point, Track};
use serde::{Deserialize, Serialize};

/// Built-in closed oval track.
///
/// The central curve is an ellipse sampled at `segments` points; the walls follow two
/// concentric ellipses `width / 2` inside and outside of it. Cars start on the rightmost
/// point of the central curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OvalTrack {
    pub center: Point,
    pub radius_x: f32,
    pub radius_y: f32,
    /// Distance between the inner and the outer wall
    pub width: f32,
    pub segments: usize,
    pub wall_thickness: f32,
}

impl Default for OvalTrack {
    fn default() -> Self {
        Self {
            center: Point::new(640.0, 360.0),
            radius_x: 500.0,
            radius_y: 280.0,
            width: 140.0,
            segments: 72,
            wall_thickness: evorace_engine::DEFAULT_WALL_THICKNESS,
        }
    }
}

impl OvalTrack {
    #[must_use]
    pub fn build(&self) -> Track {
        let half = self.width / 2.0;
        let central = self.ellipse(0.0);
        let inner = self.ellipse(-half);
        let outer = self.ellipse(half);
        let start = central[0];
        Track::from_curves(central, &inner, &outer, start, true)
            .with_wall_thickness(self.wall_thickness)
    }

    #[expect(clippy::cast_precision_loss)]
    fn ellipse(&self, offset: f32) -> Vec<Point> {
        let segments = self.segments.max(3);
        (0..segments)
            .map(|i| {
                let angle = TAU * i as f32 / segments as f32;
                self.center
                    + Point::new(
                        (self.radius_x + offset) * angle.cos(),
                        (self.radius_y + offset) * angle.sin(),
                    )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_oval() {
        let oval = OvalTrack::default();
        let track = oval.build();
        assert_eq!(track.curve().len(), 72);
        // one wall per boundary segment, both boundaries closed
        assert_eq!(track.walls().len(), 144);
        assert_eq!(track.start(), Point::new(1140.0, 360.0));
        // clockwise on screen: heading down from the rightmost point
        assert!((track.start_heading() - 270.0).abs() < 10.0);
    }

    #[test]
    fn test_start_is_clear_of_walls() {
        let track = OvalTrack::default().build();
        let clearance = track
            .walls()
            .iter()
            .map(|wall| wall.distance_to(track.start()))
            .fold(f32::INFINITY, f32::min);
        assert!(clearance > 60.0);
    }
}
