//! Training system evolving car-driving networks with a genetic algorithm.
//!
//! Networks are not trained by gradient descent. Each generation races on a track, the
//! distance each car covers becomes its fitness, and the next generation is bred from the
//! best drivers.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a population of randomly initialized networks
//! 2. **Race** - Each network drives one car until it crashes or time runs out
//! 3. **Fitness** - The course evaluator scores each car's net progress (`evorace-evaluator`)
//! 4. **Selection** - Parents are drawn in proportion to fitness
//! 5. **Reproduction** - Crossover and mutation produce the next generation
//! 6. **Repeat** - A fresh batch of cars spawns with the new networks
//!
//! # Architecture
//!
//! ```text
//! Race (race)
//!     ↓ drives
//! Cars + Networks (evorace-engine, evorace-nn)
//!     ↓ scored by
//! Course Evaluator (evorace-evaluator)
//!     ↓ produces
//! Population of Individuals
//!     ↓ evolved by
//! PopulationEvolver (genetic, crossover, genes)
//!     ↓ spawns
//! Next Generation
//! ```
//!
//! # Modules
//!
//! - [`race`] - Owns the live cars and runs the generation lifecycle
//! - [`genetic`] - Individuals, populations and the evolution step
//! - [`crossover`] - Network-level crossover strategies
//! - [`genes`] - Crossover and mutation on flat parameter buffers
//! - [`stats`] - Per-generation fitness statistics
//!
//! # Example
//!
//! ```
//! use evorace_engine::{Point, Track, Wall};
//! use evorace_training::race::{Race, RaceParams};
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(7);
//! let curve: Vec<Point> = (0..5).map(|i| Point::new(i as f32 * 100.0, 0.0)).collect();
//! let walls = vec![Wall::new(Point::new(450.0, -100.0), Point::new(450.0, 100.0))];
//! let track = Track::new(curve, walls, Point::ORIGIN, 0.0);
//!
//! let params = RaceParams {
//!     population_size: 10,
//!     time_budget: 50.0,
//!     ..RaceParams::default()
//! };
//! let mut race = Race::new(track, params, &mut rng).unwrap();
//!
//! let report = loop {
//!     if let Some(report) = race.tick(1.0, &mut rng).unwrap() {
//!         break report;
//!     }
//! };
//! assert_eq!(report.generation, 0);
//! assert_eq!(report.fitness.count, 10);
//! assert_eq!(race.generation(), 1);
//! ```
//!
//! # Current Limitations
//!
//! - **Single track**: A generation races on one track, so networks can overfit its shape
//! - **One run per individual**: Fitness comes from a single noisy run, with spawn jitter
//!   as the only source of variation
//! - **Single-threaded**: Cars are updated one after another

pub mod crossover;
pub mod genes;
pub mod genetic;
pub mod race;
pub mod stats;
