use std::path::Path;

use evorace_training::race::RaceParams;
use serde::{Deserialize, Serialize};

use crate::{track::OvalTrack, util};

/// Complete configuration of a training run.
///
/// Every field has a default, so a config file only needs the values it changes:
///
/// ```json
/// { "generations": 200, "race": { "population_size": 40, "fitness": { "exponent": 3.0 } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of generations to train
    pub generations: usize,
    /// Simulated time step of one tick
    pub dt: f32,
    /// Seed of the random number generator; drawn at random when absent
    pub seed: Option<u64>,
    pub track: OvalTrack,
    pub race: RaceParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generations: 50,
            dt: 1.0,
            seed: None,
            track: OvalTrack::default(),
            race: RaceParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        util::load_json("config", path)
    }

    /// Rejects values that would make a run hang, panic or score every car as NaN.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.dt.is_finite() && self.dt > 0.0,
            "time step must be positive, got {}",
            self.dt
        );
        let budget = self.race.time_budget;
        anyhow::ensure!(
            budget.is_finite() && budget > 0.0,
            "time budget must be positive, got {budget}"
        );
        let probability = self.race.evolver.mutation_probability;
        anyhow::ensure!(
            (0.0..=1.0).contains(&probability),
            "mutation probability must be within [0, 1], got {probability}"
        );

        let fitness = &self.race.fitness;
        anyhow::ensure!(
            fitness.scale.is_finite() && fitness.scale > 0.0,
            "fitness scale must be positive, got {}",
            fitness.scale
        );
        anyhow::ensure!(
            fitness.exponent.is_finite(),
            "fitness exponent must be finite, got {}",
            fitness.exponent
        );
        let car = &self.race.car;
        anyhow::ensure!(
            car.sensors.ray_length.is_finite() && car.sensors.ray_length > 0.0,
            "ray length must be positive, got {}",
            car.sensors.ray_length
        );
        anyhow::ensure!(
            car.max_velocity.is_finite() && car.max_velocity > 0.0,
            "max velocity must be positive, got {}",
            car.max_velocity
        );
        Ok(())
    }
}
