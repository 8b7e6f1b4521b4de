//! Generation-by-generation race orchestration.
//!
//! A [`Race`] owns one generation of AI cars (plus any human drivers) on a shared
//! [`Track`]. Every [`tick`](Race::tick) moves all cars, retires the ones that crashed and
//! banks their fitness. Once no AI car is left, or the time budget runs out, the banked
//! population is evolved and a new batch of cars is spawned.
//!
//! # Generation Lifecycle
//!
//! ```text
//! spawn population_size AI cars (start pose + jitter)
//!     ↓ tick(dt) ...
//! crashed car → fitness evaluated once → Individual banked → car removed
//!     ↓ no AI car left, or elapsed ≥ time_budget, or restart_generation()
//! surviving AI cars scored → evolve(banked) → new batch spawned
//! ```
//!
//! The swap is all or nothing: when evolution fails, the cars, the banked individuals
//! and the generation counter are left as they were.
//!
//! Human cars share the motion model but are not part of the population. A crashed human
//! car is put back at the start pose.

use evorace_engine::{Car, CarError, CarParams, Controller, HumanInput, Point, Track};
use evorace_evaluator::{
    EmptyCurveError,
    curve::ReferenceCurve,
    fitness::{CourseEvaluator, FitnessParams},
};
use evorace_nn::{Activation, LayerSpec, NetworkError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    genetic::{EvolutionError, Individual, Population, PopulationEvolver},
    stats::FitnessStats,
};

/// Number of network outputs: rotation, then engine.
pub const CONTROL_OUTPUTS: usize = 2;

/// Hidden part of the network topology.
///
/// Input and output sizes are not configurable: the input layer has one unit per sensor
/// reading and the output layer has [`CONTROL_OUTPUTS`] units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkTopology {
    /// Units of each hidden layer, in order
    pub hidden_units: Vec<usize>,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self {
            hidden_units: vec![6],
            hidden_activation: Activation::Sigmoid,
            output_activation: Activation::None,
        }
    }
}

impl NetworkTopology {
    /// Layer specs for a network taking `input_units` sensor readings.
    ///
    /// A layer's activation applies to the values it feeds forward, so every layer but the
    /// last hidden one carries `hidden_activation`, and the last hidden one (or the input
    /// layer when there is none) carries `output_activation`.
    #[must_use]
    pub fn layer_specs(&self, input_units: usize) -> Vec<LayerSpec> {
        let units = std::iter::once(input_units).chain(self.hidden_units.iter().copied());
        let feeding = self.hidden_units.len() + 1;
        let mut specs: Vec<LayerSpec> = units
            .enumerate()
            .map(|(i, u)| {
                let activation = if i + 1 == feeding {
                    self.output_activation
                } else {
                    self.hidden_activation
                };
                LayerSpec::new(u, activation)
            })
            .collect();
        specs.push(LayerSpec::new(CONTROL_OUTPUTS, Activation::None));
        specs
    }
}

/// Everything a race needs besides the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceParams {
    /// AI cars per generation
    pub population_size: usize,
    /// Simulated time after which a generation ends even if cars are still driving
    pub time_budget: f32,
    /// Spawn positions are offset by up to this much in each axis
    pub spawn_jitter: f32,
    /// Spawn headings are offset by up to this many degrees
    pub heading_jitter: f32,
    pub topology: NetworkTopology,
    pub car: CarParams,
    pub fitness: FitnessParams,
    pub evolver: PopulationEvolver,
}

impl Default for RaceParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            time_budget: 1000.0,
            spawn_jitter: 10.0,
            heading_jitter: 5.0,
            topology: NetworkTopology::default(),
            car: CarParams::default(),
            fitness: FitnessParams::default(),
            evolver: PopulationEvolver::default(),
        }
    }
}

impl RaceParams {
    /// Layer specs of every AI car's network.
    #[must_use]
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        self.topology.layer_specs(self.car.sensors.input_count())
    }
}

/// Summary of a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Index of the generation that just completed, starting at 0
    pub generation: usize,
    /// Simulated time the generation lasted
    pub elapsed: f32,
    pub fitness: FitnessStats,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum RaceError {
    #[display("race needs at least 2 AI cars, got {size}")]
    PopulationTooSmall { size: usize },
    #[display("invalid track: {_0}")]
    #[from]
    Curve(EmptyCurveError),
    #[display("failed to build networks: {_0}")]
    #[from]
    Network(NetworkError),
    #[display("car update failed: {_0}")]
    #[from]
    Car(CarError),
    #[display("failed to evolve the population: {_0}")]
    #[from]
    Evolution(EvolutionError),
}

/// A running race: the live cars of the current generation and the population being
/// collected from them.
#[derive(Debug, Clone)]
pub struct Race {
    track: Track,
    evaluator: CourseEvaluator,
    params: RaceParams,
    cars: Vec<Car>,
    retired: Population,
    generation: usize,
    elapsed: f32,
    best_fitness: Option<f32>,
}

impl Race {
    /// Creates a race with a random first generation.
    ///
    /// # Errors
    ///
    /// Fails when `population_size` is below 2, when the track's reference curve is
    /// empty, or when the configured topology cannot be built.
    pub fn new<R>(track: Track, params: RaceParams, rng: &mut R) -> Result<Self, RaceError>
    where
        R: Rng + ?Sized,
    {
        if params.population_size < 2 {
            return Err(RaceError::PopulationTooSmall {
                size: params.population_size,
            });
        }
        let curve = ReferenceCurve::new(track.curve().to_vec())?;
        let evaluator = CourseEvaluator::new(curve, params.fitness);
        let population = Population::random(&params.layer_specs(), params.population_size, rng)?;

        let mut race = Self {
            track,
            evaluator,
            params,
            cars: vec![],
            retired: Population::default(),
            generation: 0,
            elapsed: 0.0,
            best_fitness: None,
        };
        race.spawn_population(population, rng);
        Ok(race)
    }

    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    #[must_use]
    pub fn params(&self) -> &RaceParams {
        &self.params
    }

    #[must_use]
    pub fn evaluator(&self) -> &CourseEvaluator {
        &self.evaluator
    }

    /// Live cars, AI and human.
    #[must_use]
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Individuals retired so far in the current generation.
    #[must_use]
    pub fn retired(&self) -> &Population {
        &self.retired
    }

    /// Index of the generation currently racing.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Simulated time since the current generation spawned.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Highest fitness of any completed generation.
    #[must_use]
    pub fn best_fitness(&self) -> Option<f32> {
        self.best_fitness
    }

    /// Fitness a car would get if it were retired now.
    #[must_use]
    pub fn fitness_of(&self, car: &Car) -> f32 {
        self.evaluator.evaluate(car.start_position(), car.position())
    }

    /// Adds a human-driven car at the start pose.
    pub fn spawn_human(&mut self, input: HumanInput) {
        self.cars.push(Car::new(
            self.track.start(),
            self.track.start_heading(),
            Controller::Human(input),
            &self.params.car,
        ));
    }

    /// Updates the keys of every human-driven car.
    pub fn set_human_input(&mut self, input: HumanInput) {
        for car in &mut self.cars {
            car.set_human_input(input);
        }
    }

    /// Advances the race by `dt`.
    ///
    /// Returns the report of the generation completed during this tick, if any.
    pub fn tick<R>(&mut self, dt: f32, rng: &mut R) -> Result<Option<GenerationReport>, RaceError>
    where
        R: Rng + ?Sized,
    {
        for car in &mut self.cars {
            car.update(dt, &self.params.car, &self.track)?;
        }
        self.elapsed += dt;

        let cars = std::mem::take(&mut self.cars);
        for car in cars {
            if car.is_destroyed() {
                self.retire(car);
            } else {
                self.cars.push(car);
            }
        }

        let ai_left = self.cars.iter().any(|car| car.controller().is_ai());
        if !ai_left || self.elapsed >= self.params.time_budget {
            return self.complete_generation(rng).map(Some);
        }
        Ok(None)
    }

    /// Ends the current generation immediately, scoring the cars still driving.
    pub fn restart_generation<R>(&mut self, rng: &mut R) -> Result<GenerationReport, RaceError>
    where
        R: Rng + ?Sized,
    {
        self.complete_generation(rng)
    }

    fn retire(&mut self, car: Car) {
        if let Controller::Human(keys) = car.controller() {
            debug!("human car crashed, respawning");
            self.spawn_human(*keys);
            return;
        }
        let fitness = self.fitness_of(&car);
        debug!(
            generation = self.generation,
            fitness,
            elapsed = self.elapsed,
            "car retired"
        );
        if let Some(network) = car.into_network() {
            self.retired.push(Individual::new(network, fitness));
        }
    }

    fn complete_generation<R>(&mut self, rng: &mut R) -> Result<GenerationReport, RaceError>
    where
        R: Rng + ?Sized,
    {
        let mut outgoing = self.retired.clone();
        for car in &self.cars {
            if let Some(network) = car.controller().network() {
                outgoing.push(Individual::new(network.clone(), self.fitness_of(car)));
            }
        }
        let fitness = outgoing
            .fitness_stats()
            .ok_or(EvolutionError::PopulationTooSmall { size: 0 })?;
        let next = self.params.evolver.evolve(&outgoing, rng)?;

        let report = GenerationReport {
            generation: self.generation,
            elapsed: self.elapsed,
            fitness,
        };
        info!(
            generation = report.generation,
            individuals = fitness.count,
            mean = fitness.mean,
            max = fitness.max,
            "generation completed"
        );

        self.cars.retain(|car| car.controller().is_human());
        self.retired = Population::default();
        self.generation += 1;
        self.elapsed = 0.0;
        self.best_fitness = Some(
            self.best_fitness
                .map_or(fitness.max, |best| best.max(fitness.max)),
        );
        self.spawn_population(next, rng);
        Ok(report)
    }

    fn spawn_population<R>(&mut self, population: Population, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let jitter = self.params.spawn_jitter.abs();
        let heading_jitter = self.params.heading_jitter.abs();
        for individual in population {
            let offset = Point::new(
                rng.random_range(-jitter..=jitter),
                rng.random_range(-jitter..=jitter),
            );
            let heading = self.track.start_heading()
                + rng.random_range(-heading_jitter..=heading_jitter);
            self.cars.push(Car::new(
                self.track.start() + offset,
                heading,
                Controller::Ai(individual.into_network()),
                &self.params.car,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use evorace_engine::Wall;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn curve() -> Vec<Point> {
        (0..10u8)
            .map(|i| Point::new(f32::from(i) * 100.0, 0.0))
            .collect()
    }

    /// A track whose only wall runs through the start point.
    fn crash_track() -> Track {
        let wall = Wall::new(Point::new(-200.0, 0.0), Point::new(200.0, 0.0));
        Track::new(curve(), vec![wall], Point::ORIGIN, 0.0)
    }

    fn open_track() -> Track {
        Track::new(curve(), vec![], Point::ORIGIN, 0.0)
    }

    fn params(population_size: usize) -> RaceParams {
        RaceParams {
            population_size,
            time_budget: 5.0,
            ..RaceParams::default()
        }
    }

    #[test]
    fn test_default_topology() {
        let specs = RaceParams::default().layer_specs();
        assert_eq!(
            specs,
            [
                LayerSpec::new(7, Activation::Sigmoid),
                LayerSpec::new(6, Activation::None),
                LayerSpec::new(2, Activation::None),
            ]
        );
        let direct = NetworkTopology {
            hidden_units: vec![],
            ..NetworkTopology::default()
        };
        assert_eq!(
            direct.layer_specs(3),
            [
                LayerSpec::new(3, Activation::None),
                LayerSpec::new(2, Activation::None),
            ]
        );
    }

    #[test]
    fn test_spawns_population() {
        let mut rng = Pcg32::seed_from_u64(1);
        let race = Race::new(open_track(), params(8), &mut rng).unwrap();
        assert_eq!(race.cars().len(), 8);
        assert_eq!(race.generation(), 0);
        for car in race.cars() {
            assert!(car.controller().is_ai());
            assert!(car.position().x.abs() <= 10.0 && car.position().y.abs() <= 10.0);
            let heading = car.heading();
            assert!(heading <= 5.0 || heading >= 355.0);
        }
    }

    #[test]
    fn test_immediate_crash_completes_generation() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut race = Race::new(crash_track(), params(7), &mut rng).unwrap();
        let report = race.tick(1.0, &mut rng).unwrap().unwrap();
        assert_eq!(report.generation, 0);
        assert_eq!(report.fitness.count, 7);
        assert_eq!(race.generation(), 1);
        assert_eq!(race.cars().len(), 7);
        assert!(race.retired().is_empty());
        assert!(race.elapsed().abs() < f32::EPSILON);
        assert!(race.best_fitness().is_some());
    }

    #[test]
    fn test_time_budget_ends_generation() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut race = Race::new(open_track(), params(4), &mut rng).unwrap();
        for _ in 0..4 {
            assert!(race.tick(1.0, &mut rng).unwrap().is_none());
        }
        let report = race.tick(1.0, &mut rng).unwrap().unwrap();
        assert!((report.elapsed - 5.0).abs() < f32::EPSILON);
        assert_eq!(report.fitness.count, 4);
        assert!(report.fitness.min >= 0.0);
        assert_eq!(race.generation(), 1);
    }

    #[test]
    fn test_restart_generation() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut race = Race::new(open_track(), params(6), &mut rng).unwrap();
        race.tick(1.0, &mut rng).unwrap();
        let report = race.restart_generation(&mut rng).unwrap();
        assert_eq!(report.generation, 0);
        assert_eq!(report.fitness.count, 6);
        assert_eq!(race.generation(), 1);
        assert_eq!(race.cars().len(), 6);
    }

    #[test]
    fn test_human_is_respawned_and_never_enrolled() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut race = Race::new(crash_track(), params(4), &mut rng).unwrap();
        race.spawn_human(HumanInput::default());
        let report = race.tick(1.0, &mut rng).unwrap().unwrap();
        assert_eq!(report.fitness.count, 4);
        let humans: Vec<_> = race
            .cars()
            .iter()
            .filter(|car| car.controller().is_human())
            .collect();
        assert_eq!(humans.len(), 1);
        assert!(!humans[0].is_destroyed());
        assert_eq!(humans[0].position(), Point::ORIGIN);
        assert_eq!(race.cars().len(), 5);
    }

    #[test]
    fn test_respawned_human_keeps_held_keys() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut race = Race::new(crash_track(), params(2), &mut rng).unwrap();
        let held = HumanInput {
            forward: true,
            left: true,
            ..HumanInput::default()
        };
        race.spawn_human(held);
        race.tick(1.0, &mut rng).unwrap();
        let human = race
            .cars()
            .iter()
            .find(|car| car.controller().is_human())
            .unwrap();
        assert!(!human.is_destroyed());
        assert_eq!(human.controller(), &Controller::Human(held));
    }

    #[test]
    fn test_human_input_reaches_human_cars() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut race = Race::new(open_track(), params(2), &mut rng).unwrap();
        race.spawn_human(HumanInput::default());
        let forward = HumanInput {
            forward: true,
            ..HumanInput::default()
        };
        race.set_human_input(forward);
        let human = race.cars().last().unwrap();
        assert_eq!(human.controller(), &Controller::Human(forward));
    }

    #[test]
    fn test_invalid_setup() {
        let mut rng = Pcg32::seed_from_u64(7);
        assert!(matches!(
            Race::new(open_track(), params(1), &mut rng),
            Err(RaceError::PopulationTooSmall { size: 1 })
        ));
        let no_curve = Track::new(vec![], vec![], Point::ORIGIN, 0.0);
        assert!(matches!(
            Race::new(no_curve, params(4), &mut rng),
            Err(RaceError::Curve(EmptyCurveError))
        ));
    }

    #[test]
    fn test_seeded_races_are_reproducible() {
        let run = || {
            let mut rng = Pcg32::seed_from_u64(8);
            let mut race = Race::new(open_track(), params(6), &mut rng).unwrap();
            let mut reports = vec![];
            while reports.len() < 2 {
                if let Some(report) = race.tick(1.0, &mut rng).unwrap() {
                    reports.push(report);
                }
            }
            reports
        };
        assert_eq!(run(), run());
    }
}
