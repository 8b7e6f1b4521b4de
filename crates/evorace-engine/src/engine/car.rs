use evorace_nn::NeuralNetwork;

use crate::{
    CarError,
    core::{Point, Track, Wall, segment_distance},
};

use super::{
    control::{ControlInput, Controller, HumanInput},
    params::CarParams,
    ray::Ray,
};

/// A simulated car, driven either by a human or by a neural network.
///
/// Cars start `Active` and become `Destroyed` the tick their hitbox touches a wall.
/// Destruction is terminal: later calls to [`update`](Self::update) do nothing.
#[derive(Debug, Clone)]
pub struct Car {
    position: Point,
    start_position: Point,
    heading: f32,
    velocity: f32,
    destroyed: bool,
    rays: Vec<Ray>,
    controller: Controller,
}

impl Car {
    #[must_use]
    pub fn new(position: Point, heading: f32, controller: Controller, params: &CarParams) -> Self {
        Self {
            position,
            start_position: position,
            heading: heading.rem_euclid(360.0),
            velocity: 0.0,
            destroyed: false,
            rays: Ray::fan(params.sensors.ray_count, params.sensors.ray_length),
            controller,
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    #[must_use]
    pub fn start_position(&self) -> Point {
        self.start_position
    }

    /// Heading in degrees, within `[0, 360)`.
    #[must_use]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Replaces the keys of a human-driven car. AI cars ignore this.
    pub fn set_human_input(&mut self, input: HumanInput) {
        if let Controller::Human(keys) = &mut self.controller {
            *keys = input;
        }
    }

    /// Marks the car destroyed without a collision (e.g. the race ran out of time).
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Consumes the car, handing back the network that drove it.
    #[must_use]
    pub fn into_network(self) -> Option<NeuralNetwork> {
        match self.controller {
            Controller::Human(_) => None,
            Controller::Ai(network) => Some(network),
        }
    }

    /// Network inputs built from the current sensor readings.
    ///
    /// One normalized distance per ray, followed by `velocity / max_velocity` when the
    /// sensors include velocity.
    #[must_use]
    pub fn sensor_inputs(&self, params: &CarParams) -> Vec<f32> {
        let mut inputs: Vec<f32> = self.rays.iter().map(Ray::normalized).collect();
        if params.sensors.include_velocity {
            inputs.push(self.velocity / params.max_velocity);
        }
        inputs
    }

    /// Advances the car by one tick of `dt`.
    ///
    /// Senses, asks the controller for actuation, moves and finally checks for collisions.
    /// Returns whether the car is destroyed afterwards.
    pub fn update(&mut self, dt: f32, params: &CarParams, track: &Track) -> Result<bool, CarError> {
        if self.destroyed {
            return Ok(true);
        }
        let nearby: Vec<&Wall> = track
            .walls_near(self.position, params.sensors.nearby_radius())
            .collect();

        for ray in &mut self.rays {
            ray.sense(self.position, self.heading, nearby.iter().copied());
        }
        let input = self
            .controller
            .control_input(&self.sensor_inputs(params))?;
        self.apply_control(input, dt, params);

        let half_thickness = track.wall_thickness() / 2.0;
        if nearby
            .iter()
            .any(|wall| self.collides_with(wall, half_thickness, params))
        {
            self.destroyed = true;
        }
        Ok(self.destroyed)
    }

    /// Integrates the motion model for one tick.
    ///
    /// ```text
    /// velocity' = clamp(velocity + acceleration · engine · dt, -max_velocity / 2, max_velocity)
    /// position' = position + velocity' · direction(heading) · dt
    /// heading'  = (heading + rotation_speed · rotation · dt) mod 360
    /// ```
    ///
    /// A coasting input (a human holding neither throttle key) instead loses
    /// `deceleration · dt` of speed until the car stops.
    pub fn apply_control(&mut self, input: ControlInput, dt: f32, params: &CarParams) {
        self.velocity = if input.coasts() {
            let decay = params.deceleration * dt;
            if self.velocity > 0.0 {
                (self.velocity - decay).max(0.0)
            } else {
                (self.velocity + decay).min(0.0)
            }
        } else {
            (self.velocity + params.acceleration * input.engine() * dt)
                .clamp(-params.max_velocity / 2.0, params.max_velocity)
        };
        self.position = self.position + Point::from_heading(self.heading) * (self.velocity * dt);
        self.heading =
            (self.heading + params.rotation_speed * input.rotation() * dt).rem_euclid(360.0);
    }

    /// Corners of the hitbox rectangle, in order around its boundary.
    #[must_use]
    pub fn hitbox(&self, params: &CarParams) -> [Point; 4] {
        let forward = Point::from_heading(self.heading) * (params.length / 2.0);
        let side = Point::from_heading(self.heading + 90.0) * (params.width / 2.0);
        let p = self.position;
        [
            p + forward + side,
            p + forward - side,
            p - forward - side,
            p - forward + side,
        ]
    }

    /// Whether the hitbox touches a wall stroke of half width `half_thickness`.
    #[must_use]
    pub fn collides_with(&self, wall: &Wall, half_thickness: f32, params: &CarParams) -> bool {
        let corners = self.hitbox(params);
        let touches_edge = (0..4).any(|i| {
            let edge = (corners[i], corners[(i + 1) % 4]);
            segment_distance(edge, wall.segment()) <= half_thickness
        });
        touches_edge || self.contains(wall.start(), params)
    }

    fn contains(&self, point: Point, params: &CarParams) -> bool {
        let offset = point - self.position;
        let along = offset.dot(Point::from_heading(self.heading));
        let across = offset.dot(Point::from_heading(self.heading + 90.0));
        along.abs() <= params.length / 2.0 && across.abs() <= params.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use evorace_nn::{Activation, LayerSpec};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn human(position: Point, heading: f32) -> Car {
        Car::new(
            position,
            heading,
            Controller::Human(HumanInput::default()),
            &CarParams::default(),
        )
    }

    fn empty_track() -> Track {
        Track::new(vec![Point::ORIGIN], vec![], Point::ORIGIN, 0.0)
    }

    #[test]
    fn test_acceleration_is_clamped() {
        let params = CarParams::default();
        let mut car = human(Point::ORIGIN, 0.0);
        for _ in 0..200 {
            car.apply_control(ControlInput::new(1.0, 0.0), 1.0, &params);
        }
        assert!(approx(car.velocity(), params.max_velocity));

        for _ in 0..400 {
            car.apply_control(ControlInput::new(-1.0, 0.0), 1.0, &params);
        }
        assert!(approx(car.velocity(), -params.max_velocity / 2.0));
    }

    #[test]
    fn test_coasting_stops() {
        let params = CarParams::default();
        let mut car = human(Point::ORIGIN, 0.0);
        car.apply_control(ControlInput::new(1.0, 0.0), 5.0, &params);
        assert!(approx(car.velocity(), 1.0));
        car.apply_control(ControlInput::IDLE, 1.0, &params);
        assert!(approx(car.velocity(), 0.5));
        car.apply_control(ControlInput::IDLE, 10.0, &params);
        assert!(approx(car.velocity(), 0.0));
    }

    #[test]
    fn test_zero_engine_holds_speed_without_coasting() {
        let params = CarParams::default();
        let mut car = human(Point::ORIGIN, 0.0);
        car.apply_control(ControlInput::raw(10.0, 0.0), 1.0, &params);
        assert!(approx(car.velocity(), 2.0));
        car.apply_control(ControlInput::raw(0.0, 0.0), 1.0, &params);
        assert!(approx(car.velocity(), 2.0));
    }

    #[test]
    fn test_ai_outputs_scale_motion() {
        let params = CarParams::default();
        let specs = [
            LayerSpec::new(params.sensors.input_count(), Activation::None),
            LayerSpec::new(2, Activation::None),
        ];
        let base = NeuralNetwork::new(&specs, &mut Pcg32::seed_from_u64(4)).unwrap();
        // rotation 3, engine 5 regardless of the sensors
        let layer = base.weighted_layers()[0]
            .with_weights(vec![0.0; 2 * params.sensors.input_count()])
            .and_then(|l| l.with_bias(vec![3.0, 5.0]))
            .unwrap();
        let network = base.with_weighted_layers(vec![layer]).unwrap();
        let mut car = Car::new(Point::ORIGIN, 0.0, Controller::Ai(network), &params);
        car.update(1.0, &params, &empty_track()).unwrap();
        assert!(approx(car.velocity(), 1.0));
        assert!(approx(car.heading(), 10.5));
    }

    #[test]
    fn test_moves_along_heading() {
        let params = CarParams::default();
        let mut car = human(Point::ORIGIN, 90.0);
        car.apply_control(ControlInput::new(1.0, 0.0), 1.0, &params);
        // 90 degrees is up on screen
        assert!(approx(car.position().x, 0.0));
        assert!(approx(car.position().y, -0.2));
    }

    #[test]
    fn test_heading_wraps() {
        let params = CarParams::default();
        let mut car = human(Point::ORIGIN, 1.0);
        car.apply_control(ControlInput::new(0.0, -1.0), 1.0, &params);
        assert!(approx(car.heading(), 357.5));
        car.apply_control(ControlInput::new(0.0, 1.0), 1.0, &params);
        assert!(approx(car.heading(), 1.0));
    }

    #[test]
    fn test_collision_destroys_once() {
        let params = CarParams::default();
        let wall = Wall::new(Point::new(40.0, -100.0), Point::new(40.0, 100.0));
        let track = Track::new(vec![Point::ORIGIN], vec![wall], Point::ORIGIN, 0.0);
        let mut car = human(Point::ORIGIN, 0.0);
        // front edge at x = 30, wall stroke reaches x = 32.5
        assert!(!car.collides_with(&wall, 7.5, &params));
        assert!(car.collides_with(&wall, 12.0, &params));

        car.set_human_input(HumanInput {
            forward: true,
            ..HumanInput::default()
        });
        let mut ticks = 0;
        while !car.update(1.0, &params, &track).unwrap() {
            ticks += 1;
            assert!(ticks < 100, "car never reached the wall");
        }
        let frozen = car.position();
        assert!(car.update(1.0, &params, &track).unwrap());
        assert_eq!(car.position(), frozen);
    }

    #[test]
    fn test_wall_inside_hitbox_collides() {
        let params = CarParams::default();
        let car = human(Point::ORIGIN, 0.0);
        let tiny = Wall::new(Point::new(1.0, 1.0), Point::new(2.0, 1.0));
        assert!(car.collides_with(&tiny, 0.0, &params));
    }

    #[test]
    fn test_rotated_hitbox() {
        let params = CarParams::default();
        let car = human(Point::ORIGIN, 90.0);
        // pointing up: 60 tall, 30 wide
        let side_wall = Wall::new(Point::new(20.0, -100.0), Point::new(20.0, 100.0));
        assert!(!car.collides_with(&side_wall, 2.0, &params));
        let top_wall = Wall::new(Point::new(-100.0, -31.0), Point::new(100.0, -31.0));
        assert!(car.collides_with(&top_wall, 2.0, &params));
    }

    #[test]
    fn test_sensor_inputs() {
        let params = CarParams::default();
        let wall = Wall::new(Point::new(125.0, -100.0), Point::new(125.0, 100.0));
        let track = Track::new(vec![Point::ORIGIN], vec![wall], Point::ORIGIN, 0.0);
        let mut car = Car::new(
            Point::ORIGIN,
            0.0,
            Controller::Human(HumanInput::default()),
            &params,
        );
        car.update(1.0, &params, &track).unwrap();
        let inputs = car.sensor_inputs(&params);
        assert_eq!(inputs.len(), params.sensors.input_count());
        assert!(inputs.iter().all(|v| (0.0..=1.0).contains(v)));
        // the rays 18 degrees off the heading see the wall, the sideways ones do not
        assert!(approx(inputs[2], 125.0 / 18f32.to_radians().cos() / 250.0));
        assert!(inputs[..6].iter().any(|v| *v < 1.0));
        assert!(approx(inputs[0], 1.0));
    }

    #[test]
    fn test_ai_car_drives_and_returns_network() {
        let params = CarParams::default();
        let specs = [
            LayerSpec::new(params.sensors.input_count(), Activation::Relu),
            LayerSpec::new(2, Activation::None),
        ];
        let network = NeuralNetwork::new(&specs, &mut Pcg32::seed_from_u64(9)).unwrap();
        let mut car = Car::new(
            Point::ORIGIN,
            0.0,
            Controller::Ai(network.clone()),
            &params,
        );
        car.update(1.0, &params, &empty_track()).unwrap();
        assert!(!car.is_destroyed());
        assert_eq!(car.start_position(), Point::ORIGIN);
        assert_eq!(car.into_network(), Some(network));
    }

    #[test]
    fn test_human_car_has_no_network() {
        assert_eq!(human(Point::ORIGIN, 0.0).into_network(), None);
    }
}
