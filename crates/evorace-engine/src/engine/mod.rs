//! Agent simulation: ray sensors, control sources and car dynamics.
//!
//! This module drives a single car through a [`Track`](crate::Track) one tick at a time:
//!
//! - [`Ray`] - Fan-shaped distance sensors cast against nearby walls
//! - [`Controller`] - Where actuation comes from (human keys or a neural network)
//! - [`Car`] - Shared motion model, collision detection and the `Active -> Destroyed` lifecycle
//! - [`CarParams`] / [`SensorParams`] - Tunable physical and sensing constants
//!
//! # Tick Order
//!
//! Every call to [`Car::update`] performs, in order:
//!
//! 1. Cast every ray against the walls near the car
//! 2. Ask the controller for a [`ControlInput`] (the network reads normalized ray distances)
//! 3. Integrate velocity, position and heading
//! 4. Destroy the car if its hitbox touches a wall
//!
//! A destroyed car is never updated again.
//!
//! # Example
//!
//! ```
//! use evorace_engine::{Car, CarParams, Controller, HumanInput, Point, Track, Wall};
//!
//! let track = Track::new(
//!     vec![Point::new(0.0, 0.0), Point::new(500.0, 0.0)],
//!     vec![Wall::new(Point::new(300.0, -100.0), Point::new(300.0, 100.0))],
//!     Point::new(0.0, 0.0),
//!     0.0,
//! );
//! let params = CarParams::default();
//! let forward = HumanInput { forward: true, ..HumanInput::default() };
//! let controller = Controller::Human(forward);
//! let mut car = Car::new(track.start(), track.start_heading(), controller, &params);
//!
//! while !car.is_destroyed() {
//!     car.update(1.0, &params, &track).unwrap();
//! }
//! assert!(car.position().x > 200.0);
//! ```

pub use self::{car::*, control::*, params::*, ray::*};

mod car;
mod control;
mod params;
mod ray;
