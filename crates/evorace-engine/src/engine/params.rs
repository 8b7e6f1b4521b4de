use serde::{Deserialize, Serialize};

/// Physical constants of a car.
///
/// Velocities and rates are per tick; `dt` scales them (a tick of `dt = 1.0` is one frame
/// at the target frame rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    /// Degrees turned per tick at full rotation input
    pub rotation_speed: f32,
    /// Forward velocity limit (reverse is limited to half of it)
    pub max_velocity: f32,
    /// Velocity gained per tick at full engine input
    pub acceleration: f32,
    /// Velocity lost per tick while coasting
    pub deceleration: f32,
    /// Hitbox extent along the heading
    pub length: f32,
    /// Hitbox extent across the heading
    pub width: f32,
    pub sensors: SensorParams,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            rotation_speed: 3.5,
            max_velocity: 11.0,
            acceleration: 0.2,
            deceleration: 0.5,
            length: 60.0,
            width: 30.0,
            sensors: SensorParams::default(),
        }
    }
}

/// Ray sensor layout and the network input built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Number of rays in the fan (at least 2 are cast)
    pub ray_count: usize,
    pub ray_length: f32,
    /// Append `velocity / max_velocity` to the ray readings
    pub include_velocity: bool,
    /// Only walls within `nearby_factor * ray_length` of the car are considered
    pub nearby_factor: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            ray_count: 6,
            ray_length: 250.0,
            include_velocity: true,
            nearby_factor: 1.5,
        }
    }
}

impl SensorParams {
    /// Number of rays actually cast.
    #[must_use]
    pub fn effective_ray_count(&self) -> usize {
        self.ray_count.max(2)
    }

    /// Length of the network input vector these sensors produce.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.effective_ray_count() + usize::from(self.include_velocity)
    }

    /// Radius within which walls are considered for sensing and collision.
    #[must_use]
    pub fn nearby_radius(&self) -> f32 {
        self.ray_length * self.nearby_factor
    }
}
