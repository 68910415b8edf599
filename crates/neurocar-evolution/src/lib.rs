//! Generic generational genetic algorithm.
//!
//! This crate evolves populations of candidate solutions toward higher fitness. It is
//! agnostic to what a candidate is: domain code implements the [`Genome`] trait and the
//! engine takes care of population bookkeeping, selection, elitism and parallel fitness
//! evaluation.
//!
//! # How Evolution Works
//!
//! 1. **Initialization** - Every genome of the initial population is configured with
//!    the domain parameters ([`Genome::init`])
//! 2. **Evaluation** - Each individual computes its fitness on a pool of worker threads
//! 3. **Ranking** - Individuals are stably ranked by fitness, best first
//! 4. **Elitism** - The top individuals are cloned, reset, and carried over unchanged
//! 5. **Reproduction** - Remaining slots are filled by roulette selection, uniform
//!    crossover and mutation
//! 6. **Repeat** - Continue for the requested number of generations
//!
//! # Architecture
//!
//! ```text
//! Evolution (driver)
//!     ↓ owns
//! Population  ──evaluated by──>  worker threads (Genome::compute_fitness)
//!     ↓ ranked by
//! PopulationEvolver (elitism + SelectionMethod)
//!     ↓ produces
//! next Population
//! ```
//!
//! Caller-owned [generation hooks](evolution::GenerationHook) observe the population
//! before and after each generation's evaluation, e.g. to log statistics or persist
//! the best genome.
//!
//! # Example
//!
//! ```
//! use neurocar_evolution::{
//!     ConfigError, EvaluationError, Evolution, EvolutionParams, Fitness, Genome,
//!     GenomeRng, Population,
//! };
//! use rand::{Rng, SeedableRng as _};
//!
//! /// Maximizes the number of `true` bits.
//! #[derive(Debug, Clone)]
//! struct Bits(Vec<bool>);
//!
//! impl Genome for Bits {
//!     type Params = ();
//!
//!     fn init(&mut self, _params: &()) -> Result<(), ConfigError> {
//!         Ok(())
//!     }
//!
//!     fn randomize(&mut self, seed: u64) {
//!         let mut rng = GenomeRng::seed_from_u64(seed);
//!         self.0.iter_mut().for_each(|b| *b = rng.random());
//!     }
//!
//!     fn compute_fitness(&mut self, _: usize, _: &mut GenomeRng) -> Result<Fitness, EvaluationError> {
//!         Ok(self.0.iter().filter(|b| **b).count() as Fitness)
//!     }
//!
//!     fn reset(&mut self) {}
//!
//!     fn crossover<R: Rng + ?Sized>(&self, partner: &Self, rng: &mut R) -> Self {
//!         Bits(self.0.iter().zip(&partner.0).map(|(a, b)| if rng.random() { *a } else { *b }).collect())
//!     }
//!
//!     fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
//!         for bit in &mut self.0 {
//!             if rng.random_bool(rate) {
//!                 *bit = !*bit;
//!             }
//!         }
//!     }
//! }
//!
//! let population = Population::random(&Bits(vec![false; 16]), 20, 42).unwrap();
//! let params = EvolutionParams {
//!     mutation_rate: 0.05,
//!     elite_count: 2,
//!     seed: 42,
//!     ..EvolutionParams::default()
//! };
//! let mut evolution = Evolution::new(params, ());
//! let population = evolution.evolve(population, 30).unwrap();
//! assert_eq!(population.len(), 20);
//! assert!(population.best().fitness() >= 8.0);
//! ```
//!
//! # Design Principles
//!
//! ## Genome Agnosticism
//!
//! The driver is generic over [`Genome`] and never inspects a genome's contents. Fitness
//! is always "higher is better"; domains measuring a distance must normalize it.
//!
//! ## Reproducibility
//!
//! All randomness derives from [`EvolutionParams::seed`]. Selection, crossover and
//! mutation draw from one driver-owned generator; each fitness evaluation gets its own
//! generator derived from `(seed, generation, index)`, so results do not depend on the
//! number of worker threads.
//!
//! ## Failure Policy
//!
//! The engine performs no local recovery. Invalid parameters are rejected before the
//! first generation and any evaluation or hook failure aborts the run with the
//! generation (and individual) that caused it.

pub use self::{error::*, evolution::*, genome::*, population::*, rng::GenomeRng, selection::*};

pub mod error;
pub mod evolution;
pub mod genome;
pub mod population;
pub mod rng;
pub mod selection;

#[cfg(test)]
mod testing;
