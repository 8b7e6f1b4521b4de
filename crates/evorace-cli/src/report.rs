use chrono::{DateTime, Utc};
use evorace_training::race::GenerationReport;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;

/// Outcome of a `train` run, written as JSON.
///
/// Networks are not included; the seed and the config are enough to reproduce the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub best_fitness: Option<f32>,
    pub config: SimulationConfig,
    pub generations: Vec<GenerationReport>,
}
