//! Parent selection, elitism and reproduction.
//!
//! # Reproduction
//!
//! [`PopulationEvolver::evolve`] turns an evaluated population into the next
//! generation:
//!
//! 1. **Ranking** - Individuals are stably sorted by fitness, best first
//! 2. **Elitism** - The top `elite_count` individuals are cloned and reset
//! 3. **Selection** - Two parents are drawn from the whole ranked population
//! 4. **Crossover** - The parents produce one offspring ([`Genome::crossover`])
//! 5. **Mutation** - The offspring is mutated with `mutation_rate` and reset
//!
//! Steps 3 to 5 repeat until the next generation has the same size as the current one.
//!
//! # Selection Methods
//!
//! ## Roulette
//!
//! Fitness-proportionate selection: an individual is picked with probability
//! `fitness / total_fitness`. Negative fitness counts as zero. When the total is not
//! positive, every individual is equally likely.
//!
//! ## Tournament
//!
//! Randomly draw `size` distinct individuals and keep the fittest. Larger tournaments
//! create stronger selection pressure.

use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, EvolutionParams, Genome, Individual, Population};

/// How parents are drawn from the ranked population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SelectionMethod {
    /// Fitness-proportionate selection.
    #[default]
    Roulette,
    /// Best of `size` uniformly drawn individuals.
    Tournament { size: usize },
}

impl SelectionMethod {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Tournament { size: 0 } => Err(ConfigError::TournamentSizeZero),
            Self::Roulette | Self::Tournament { .. } => Ok(()),
        }
    }

    /// Selects one parent from `ranked` (individuals ordered best first).
    ///
    /// # Panics
    ///
    /// Panics if `ranked` is empty or contains an unevaluated individual.
    pub fn select<'a, G, R>(&self, ranked: &[&'a Individual<G>], rng: &mut R) -> &'a Individual<G>
    where
        G: Genome,
        R: Rng + ?Sized,
    {
        match *self {
            Self::Roulette => roulette_select(ranked, rng),
            Self::Tournament { size } => tournament_select(ranked, size, rng),
        }
    }
}

/// Selects an individual with probability proportional to its fitness.
///
/// Falls back to a uniform choice when the total fitness is not positive.
///
/// # Panics
///
/// Panics if `population` is empty or contains an unevaluated individual.
pub fn roulette_select<'a, G, R>(population: &[&'a Individual<G>], rng: &mut R) -> &'a Individual<G>
where
    G: Genome,
    R: Rng + ?Sized,
{
    let weight = |ind: &Individual<G>| ind.fitness().max(0.0);
    let total = population.iter().map(|ind| weight(ind)).sum::<f64>();
    if !(total > 0.0 && total.is_finite()) {
        return population
            .choose(rng)
            .copied()
            .expect("cannot select from an empty population");
    }

    let target = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for &ind in population {
        cumulative += weight(ind);
        if target < cumulative {
            return ind;
        }
    }
    // rounding can leave `target` just above the final cumulative sum
    population
        .iter()
        .copied()
        .rfind(|ind| weight(ind) > 0.0)
        .expect("total fitness is positive")
}

/// Selects an individual using tournament selection.
///
/// Randomly selects `tournament_size` distinct individuals and returns the one with
/// the highest fitness (the earliest one on ties).
///
/// # Panics
///
/// Panics if `population` is empty, `tournament_size` is zero, or an individual is not
/// evaluated.
pub fn tournament_select<'a, G, R>(
    population: &[&'a Individual<G>],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual<G>
where
    G: Genome,
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    population
        .choose_multiple(rng, tournament_size)
        .copied()
        .reduce(|best, ind| {
            if ind.fitness() > best.fitness() {
                ind
            } else {
                best
            }
        })
        .expect("cannot select from an empty population")
}

/// Produces the next generation from an evaluated population.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals carried over unchanged (elitism)
    pub elite_count: usize,
    /// Probability of mutating each parameter of an offspring
    pub mutation_rate: f64,
    /// Parent selection method
    pub selection: SelectionMethod,
}

impl PopulationEvolver {
    #[must_use]
    pub fn from_params(params: &EvolutionParams) -> Self {
        Self {
            elite_count: params.elite_count,
            mutation_rate: params.mutation_rate,
            selection: params.selection,
        }
    }

    /// Evolves the population to create the next generation.
    ///
    /// Elites come first, in rank order, followed by the offspring. The returned
    /// population has the same size as `population` and none of its individuals is
    /// evaluated.
    ///
    /// # Panics
    ///
    /// Panics if `population` is not fully evaluated or `elite_count` exceeds its size.
    #[must_use]
    pub fn evolve<G, R>(&self, population: &Population<G>, rng: &mut R) -> Population<G>
    where
        G: Genome,
        R: Rng + ?Sized,
    {
        let size = population.len();
        assert!(
            self.elite_count <= size,
            "elite count must not exceed the population size"
        );
        let ranked = population
            .ranking()
            .into_iter()
            .map(|i| &population.individuals()[i])
            .collect::<Vec<_>>();

        let mut next_individuals = Vec::with_capacity(size);

        // elite selection
        next_individuals.extend(
            ranked[..self.elite_count]
                .iter()
                .map(|ind| ind.reset_clone()),
        );

        // generate the rest individuals
        while next_individuals.len() < size {
            let p1 = self.selection.select(&ranked, rng);
            let p2 = self.selection.select(&ranked, rng);

            let mut child = p1.genome().crossover(p2.genome(), rng);
            child.mutate(self.mutation_rate, rng);
            child.reset();

            next_individuals.push(Individual::new(child));
        }

        Population::from_individuals(next_individuals)
    }
}
