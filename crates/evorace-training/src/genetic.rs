//! Genetic algorithm over populations of neural networks.
//!
//! Each generation, every network drives one car; the distance it covers becomes its
//! fitness. [`PopulationEvolver::evolve`] then breeds the next generation from the scored
//! population.
//!
//! # Algorithm Overview
//!
//! 1. **Sort** - Individuals by fitness, best first (`f32::total_cmp`, so the order is total
//!    even with NaN)
//! 2. **Elitism** - The top `2 + N mod 2` networks are carried over unchanged
//! 3. **Selection** - Two parents are drawn with replacement, with probability proportional
//!    to `fitness - min_fitness`
//! 4. **Crossover** - The parents are crossed into two children (see [`Crossover`])
//! 5. **Mutation** - Each child gets one weight nudged with some probability
//! 6. **Repeat** - Steps 3 to 5 run `N / 2 - 1` times, which fills the generation back to `N`
//!
//! Every individual of the new generation starts with fitness 0.
//!
//! # Key Components
//!
//! - [`Individual`] - A network and the fitness it earned
//! - [`Population`] - One generation of individuals
//! - [`PopulationEvolver`] - Crossover and mutation parameters
//!
//! # Example
//!
//! ```
//! use evorace_nn::{Activation, LayerSpec};
//! use evorace_training::genetic::{Individual, Population, PopulationEvolver};
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(42);
//! let specs = [LayerSpec::new(3, Activation::Relu), LayerSpec::new(2, Activation::None)];
//!
//! let mut population = Population::random(&specs, 6, &mut rng).unwrap();
//! // ... race the networks, then record their fitness
//! population = population
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, ind)| Individual::new(ind.into_network(), i as f32))
//!     .collect();
//!
//! let next = PopulationEvolver::default().evolve(&population, &mut rng).unwrap();
//! assert_eq!(next.len(), 6);
//! ```
//!
//! # Selection Weights
//!
//! Shifting by the minimum makes the weights non-negative whatever the sign of the
//! fitness values. The worst individual gets weight zero. When every weight is zero (all
//! individuals tied) or the weights are unusable (infinite or NaN fitness), parents are
//! drawn uniformly instead.
//!
//! # Current Limitations
//!
//! - **Fixed topology**: Only parameters evolve; layer sizes and activations never change
//! - **Weights only**: Mutation never touches biases, so they only move through crossover
//! - **One weight per mutation**: A mutation round perturbs a single weight, which makes
//!   progress slow for large networks

use evorace_nn::{LayerSpec, NetworkError, NeuralNetwork};
use rand::{
    Rng,
    distr::{Distribution as _, weighted::WeightedIndex},
};
use serde::{Deserialize, Serialize};

use crate::{
    crossover::{Crossover, CrossoverError, flat_weights},
    genes,
    stats::FitnessStats,
};

/// A single network together with the fitness it achieved.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    network: NeuralNetwork,
    fitness: f32,
}

impl Individual {
    #[must_use]
    pub fn new(network: NeuralNetwork, fitness: f32) -> Self {
        Self { network, fitness }
    }

    #[must_use]
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Fitness earned in the last race. Zero until the individual has raced.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    #[must_use]
    pub fn into_network(self) -> NeuralNetwork {
        self.network
    }
}

/// An ordered collection of individuals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    #[must_use]
    pub fn new(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    /// Creates `count` individuals with freshly initialized networks and zero fitness.
    ///
    /// # Arguments
    ///
    /// * `specs` - Network topology shared by every individual
    /// * `count` - Number of individuals
    /// * `rng` - Random number generator
    pub fn random<R>(specs: &[LayerSpec], count: usize, rng: &mut R) -> Result<Self, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| NeuralNetwork::new(specs, rng).map(|network| Individual::new(network, 0.0)))
            .collect::<Result<_, _>>()?;
        Ok(Self { individuals })
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    /// The individual with the highest fitness.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Sorts by fitness, best first.
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    /// Fitness statistics, or `None` for an empty population.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<FitnessStats> {
        FitnessStats::new(self.individuals.iter().map(Individual::fitness))
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<T: IntoIterator<Item = Individual>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Population {
    type Item = Individual;
    type IntoIter = std::vec::IntoIter<Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

/// Raised when a population cannot be evolved.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvolutionError {
    #[display("population of {size} cannot be evolved, at least 2 individuals are required")]
    PopulationTooSmall { size: usize },
    #[display("crossover failed: {_0}")]
    #[from]
    Crossover(CrossoverError),
    #[display("mutation failed: {_0}")]
    #[from]
    Network(NetworkError),
}

/// Controls how one generation is bred from the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationEvolver {
    /// Crossover strategy used for every pair of parents
    pub crossover: Crossover,
    /// Probability that a mutation round perturbs a weight
    pub mutation_probability: f32,
    /// Number of mutation rounds applied to each child
    pub mutation_count: usize,
    /// Mutation deltas are drawn from `[-mutation_range, mutation_range]`
    pub mutation_range: f32,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            crossover: Crossover::default(),
            mutation_probability: 0.5,
            mutation_count: 1,
            mutation_range: 2.0,
        }
    }
}

impl PopulationEvolver {
    /// Number of individuals carried over unchanged from a population of `size`.
    ///
    /// The odd slot of an odd-sized population goes to the elite, so children always come
    /// in pairs.
    #[must_use]
    pub const fn elite_count(size: usize) -> usize {
        2 + size % 2
    }

    /// Breeds the next generation.
    ///
    /// The input does not need to be sorted. The result has exactly as many individuals as
    /// the input, all with fitness 0, elites first.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::PopulationTooSmall`] for fewer than two individuals and
    /// [`EvolutionError::Crossover`] when two selected parents have different shapes.
    pub fn evolve<R>(
        &self,
        population: &Population,
        rng: &mut R,
    ) -> Result<Population, EvolutionError>
    where
        R: Rng + ?Sized,
    {
        let size = population.len();
        if size < 2 {
            return Err(EvolutionError::PopulationTooSmall { size });
        }

        let mut sorted = population.clone();
        sorted.sort_by_fitness();
        let individuals = sorted.individuals();

        let mut next = Vec::with_capacity(size);
        // elite selection
        next.extend(
            individuals[..Self::elite_count(size)]
                .iter()
                .map(|ind| Individual::new(ind.network.clone(), 0.0)),
        );

        let selection = selection_weights(individuals);
        for _ in 0..(size / 2 - 1) {
            let p1 = select(individuals, selection.as_ref(), rng);
            let p2 = select(individuals, selection.as_ref(), rng);
            let (c1, c2) = self.crossover.cross(&p1.network, &p2.network, rng)?;
            next.push(Individual::new(self.mutate(&c1, rng)?, 0.0));
            next.push(Individual::new(self.mutate(&c2, rng)?, 0.0));
        }

        debug_assert_eq!(next.len(), size);
        Ok(Population::new(next))
    }

    /// Applies `mutation_count` rounds of mutation to a copy of `network`.
    ///
    /// Each round, with probability `mutation_probability`, picks one weighted layer at
    /// random and adds a uniform delta in `[-mutation_range, mutation_range]` to one of its
    /// weights. Biases are left alone.
    pub fn mutate<R>(
        &self,
        network: &NeuralNetwork,
        rng: &mut R,
    ) -> Result<NeuralNetwork, NetworkError>
    where
        R: Rng + ?Sized,
    {
        let mut layers = network.weighted_layers().to_vec();
        let probability = f64::from(self.mutation_probability.clamp(0.0, 1.0));
        for _ in 0..self.mutation_count {
            if layers.is_empty() || !rng.random_bool(probability) {
                continue;
            }
            let index = rng.random_range(0..layers.len());
            let genes = genes::perturb(&flat_weights(&layers[index]), self.mutation_range, rng);
            layers[index] = layers[index].with_weights(genes)?;
        }
        network.with_weighted_layers(layers)
    }
}

fn selection_weights(individuals: &[Individual]) -> Option<WeightedIndex<f32>> {
    let min = individuals
        .iter()
        .map(Individual::fitness)
        .fold(f32::INFINITY, f32::min);
    // all-zero and non-finite weights are rejected, which falls back to uniform
    WeightedIndex::new(individuals.iter().map(|ind| ind.fitness - min)).ok()
}

fn select<'a, R>(
    individuals: &'a [Individual],
    weights: Option<&WeightedIndex<f32>>,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    let index = match weights {
        Some(weights) => weights.sample(rng),
        None => rng.random_range(0..individuals.len()),
    };
    &individuals[index]
}

#[cfg(test)]
mod tests {
    use evorace_nn::Activation;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn specs() -> [LayerSpec; 3] {
        [
            LayerSpec::new(4, Activation::Relu),
            LayerSpec::new(3, Activation::Relu),
            LayerSpec::new(2, Activation::None),
        ]
    }

    fn scored(fitness: &[f32], rng: &mut Pcg32) -> Population {
        Population::random(&specs(), fitness.len(), rng)
            .unwrap()
            .into_iter()
            .zip(fitness)
            .map(|(ind, f)| Individual::new(ind.into_network(), *f))
            .collect()
    }

    #[test]
    fn test_evolve_preserves_size() {
        let mut rng = Pcg32::seed_from_u64(1);
        let evolver = PopulationEvolver::default();
        for n in 2u16..=11 {
            let fitness: Vec<f32> = (0..n).map(f32::from).collect();
            let population = scored(&fitness, &mut rng);
            let next = evolver.evolve(&population, &mut rng).unwrap();
            assert_eq!(next.len(), usize::from(n));
            assert!(next.individuals().iter().all(|ind| ind.fitness() == 0.0));
        }
    }

    #[test]
    fn test_tied_fitness_selects_uniformly() {
        let mut rng = Pcg32::seed_from_u64(2);
        let population = scored(&[5.0; 10], &mut rng);
        assert!(selection_weights(population.individuals()).is_none());
        let next = PopulationEvolver::default()
            .evolve(&population, &mut rng)
            .unwrap();
        assert_eq!(next.len(), 10);
    }

    #[test]
    fn test_elites_are_best_unchanged() {
        let mut rng = Pcg32::seed_from_u64(3);
        let population = scored(&[1.0, 9.0, -3.0, 4.0, 7.0], &mut rng);
        let next = PopulationEvolver::default()
            .evolve(&population, &mut rng)
            .unwrap();
        // odd size: three elites, in fitness order
        let expected = [1, 4, 3];
        for (slot, source) in expected.into_iter().enumerate() {
            assert_eq!(
                next.individuals()[slot].network(),
                population.individuals()[source].network()
            );
        }
    }

    #[test]
    fn test_worst_individual_is_never_a_parent() {
        let mut rng = Pcg32::seed_from_u64(4);
        let population = scored(&[3.0, 1.0, 2.0, 1.0], &mut rng);
        let weights = selection_weights(population.individuals()).unwrap();
        for _ in 0..200 {
            let parent = select(population.individuals(), Some(&weights), &mut rng);
            assert!(parent.fitness() > 1.0);
        }
    }

    #[test]
    fn test_too_small() {
        let mut rng = Pcg32::seed_from_u64(5);
        let evolver = PopulationEvolver::default();
        assert_eq!(
            evolver.evolve(&Population::default(), &mut rng).unwrap_err(),
            EvolutionError::PopulationTooSmall { size: 0 }
        );
        assert_eq!(
            evolver
                .evolve(&scored(&[1.0], &mut rng), &mut rng)
                .unwrap_err(),
            EvolutionError::PopulationTooSmall { size: 1 }
        );
    }

    #[test]
    fn test_mismatched_topologies_fail() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut population = scored(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0], &mut rng);
        let other = NeuralNetwork::new(
            &[
                LayerSpec::new(4, Activation::Relu),
                LayerSpec::new(2, Activation::None),
            ],
            &mut rng,
        )
        .unwrap();
        for _ in 0..6 {
            population.push(Individual::new(other.clone(), 1.0));
        }
        // 12 individuals, 5 crossovers among two incompatible halves
        let result = (0..20).find_map(|_| {
            PopulationEvolver::default()
                .evolve(&population, &mut rng)
                .err()
        });
        assert!(matches!(
            result,
            Some(EvolutionError::Crossover(CrossoverError::LayerCount { .. }))
        ));
    }

    #[test]
    fn test_mutation_touches_one_weight() {
        let mut rng = Pcg32::seed_from_u64(7);
        let network = NeuralNetwork::new(&specs(), &mut rng).unwrap();
        let evolver = PopulationEvolver {
            mutation_probability: 1.0,
            ..PopulationEvolver::default()
        };
        let mutated = evolver.mutate(&network, &mut rng).unwrap();
        let mut changed = 0;
        for (before, after) in network.weighted_layers().iter().zip(mutated.weighted_layers()) {
            assert_eq!(before.bias(), after.bias());
            for (w0, w1) in before.weights().iter().zip(after.weights()) {
                if w0 != w1 {
                    changed += 1;
                    assert!((w1 - w0).abs() <= 2.0 + 1e-5);
                }
            }
        }
        assert!(changed <= 1);

        let never = PopulationEvolver {
            mutation_probability: 0.0,
            ..PopulationEvolver::default()
        };
        assert_eq!(never.mutate(&network, &mut rng).unwrap(), network);
    }

    #[test]
    fn test_stats_and_best() {
        let mut rng = Pcg32::seed_from_u64(8);
        let population = scored(&[2.0, 8.0, 5.0], &mut rng);
        assert!((population.best().unwrap().fitness() - 8.0).abs() < f32::EPSILON);
        let stats = population.fitness_stats().unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-5);
        assert!(Population::default().fitness_stats().is_none());
    }
}
