use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use evorace_training::{
    crossover::Crossover,
    race::{GenerationReport, Race},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::info;

use crate::{config::SimulationConfig, report::TrainingReport, util};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CrossoverArg {
    SinglePoint,
    Uniform,
}

impl From<CrossoverArg> for Crossover {
    fn from(arg: CrossoverArg) -> Self {
        match arg {
            CrossoverArg::SinglePoint => Self::SinglePoint,
            CrossoverArg::Uniform => Self::Uniform,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to train
    #[arg(long)]
    generations: Option<usize>,
    /// AI cars per generation
    #[arg(long)]
    population: Option<usize>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated time step of one tick
    #[arg(long)]
    dt: Option<f32>,
    /// Simulated time after which a generation ends
    #[arg(long)]
    time_budget: Option<f32>,
    /// Crossover strategy
    #[arg(long, value_enum)]
    crossover: Option<CrossoverArg>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn resolve_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population) = self.population {
            config.race.population_size = population;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(time_budget) = self.time_budget {
            config.race.time_budget = time_budget;
        }
        if let Some(crossover) = self.crossover {
            config.race.evolver.crossover = crossover.into();
        }
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let mut config = arg.resolve_config()?;
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    config.seed = Some(seed);

    let mut rng = Pcg32::seed_from_u64(seed);
    let track = config.track.build();
    let mut race =
        Race::new(track, config.race.clone(), &mut rng).context("Failed to set up the race")?;

    info!(
        seed,
        generations = config.generations,
        population = config.race.population_size,
        "training started"
    );
    if let Some(network) = race.cars().iter().find_map(|car| car.controller().network()) {
        eprintln!("Network:");
        eprintln!("{network}");
    }

    let mut generations = Vec::with_capacity(config.generations);
    while generations.len() < config.generations {
        let report = race
            .tick(config.dt, &mut rng)
            .with_context(|| format!("Generation #{} failed", race.generation()))?;
        if let Some(report) = report {
            print_generation(&report);
            generations.push(report);
        }
    }

    eprintln!("Training completed.");
    let report = TrainingReport {
        trained_at: Utc::now(),
        seed,
        best_fitness: race.best_fitness(),
        config,
        generations,
    };
    util::save_json(&report, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Report saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Seed: {}", report.seed);
    eprintln!("  Trained at: {}", report.trained_at);
    if let Some(best) = report.best_fitness {
        eprintln!("  Best fitness: {best:.3}");
    }
    eprintln!("  Generations: {}", report.generations.len());

    Ok(())
}

fn print_generation(report: &GenerationReport) {
    let stats = &report.fitness;
    eprintln!(
        "Generation #{} ({} individuals, {:.1} time units):",
        report.generation, stats.count, report.elapsed
    );
    eprintln!("  Fitness Stats:");
    eprintln!("    Min:    {:.3}", stats.min);
    eprintln!("    Max:    {:.3}", stats.max);
    eprintln!("    Mean:   {:.3}", stats.mean);
    eprintln!("    Median: {:.3}", stats.median);
    eprintln!("    StdDev: {:.3}", stats.std_dev);
}
