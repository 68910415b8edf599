//! The capability interface between the engine and domain code.
//!
//! A [`Genome`] is a domain individual (a string, a neural-network-driven car, ...)
//! that knows how to evaluate, recombine and mutate itself. The engine wraps every
//! genome in an [`Individual`], which caches the fitness computed by the last
//! evaluation.
//!
//! # Ownership
//!
//! Genomes own their mutable state. [`Genome::crossover`] returns a new value, so an
//! offspring can never alias the storage of either parent. Read-only scenario data
//! (world definitions and the like) may be shared between genomes, e.g. behind an
//! [`Arc`](std::sync::Arc).

use rand::Rng;

use crate::{ConfigError, EvaluationError, GenomeRng};

/// Fitness score. Higher is better.
pub type Fitness = f64;

/// Evolutionary capabilities of a domain individual.
///
/// `Clone` must produce a deep copy of every piece of mutable state.
pub trait Genome: Clone + Send {
    /// Domain configuration applied once before the first generation.
    type Params;

    /// Configures the genome before any generation runs.
    ///
    /// Fails if `params` are structurally invalid (e.g. a malformed network shape).
    fn init(&mut self, params: &Self::Params) -> Result<(), ConfigError>;

    /// Sets a pseudo-random starting state deterministically derived from `seed`.
    fn randomize(&mut self, seed: u64);

    /// Runs the domain evaluation for `generation` and returns the fitness.
    ///
    /// This is the only operation allowed to have side effects on the subject (e.g.
    /// driving a car through a simulated world). Resources acquired for the evaluation
    /// must be released before returning, on success and on failure alike.
    fn compute_fitness(
        &mut self,
        generation: usize,
        rng: &mut GenomeRng,
    ) -> Result<Fitness, EvaluationError>;

    /// Restores a clean, re-runnable state without touching learned parameters.
    ///
    /// Must be idempotent.
    fn reset(&mut self);

    /// Produces an offspring combining `self` and `partner`.
    ///
    /// Parameters are picked independently from either parent with a fair coin
    /// (uniform crossover).
    #[must_use]
    fn crossover<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;

    /// Perturbs each mutable parameter with independent probability `rate`.
    ///
    /// `rate == 0.0` must leave the genome unchanged and `rate == 1.0` must perturb
    /// every parameter.
    fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized;
}

/// A genome in a population, together with its cached fitness.
#[derive(Debug, Clone)]
pub struct Individual<G> {
    genome: G,
    fitness: Option<Fitness>,
}

impl<G> Individual<G>
where
    G: Genome,
{
    /// Wraps a genome that has not been evaluated yet.
    #[must_use]
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            fitness: None,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &G {
        &self.genome
    }

    #[must_use]
    pub fn into_genome(self) -> G {
        self.genome
    }

    /// Returns the fitness computed by the last evaluation.
    ///
    /// # Panics
    ///
    /// Panics if the individual has not been evaluated since it was created or reset.
    #[must_use]
    pub fn fitness(&self) -> Fitness {
        self.fitness
            .expect("fitness requested before the individual was evaluated")
    }

    /// Returns the cached fitness, or `None` if the individual is not evaluated.
    #[must_use]
    pub fn try_fitness(&self) -> Option<Fitness> {
        self.fitness
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Computes and caches the fitness of the genome.
    ///
    /// Non-finite fitness values are rejected so that ranking always works on a total
    /// order.
    pub fn evaluate(
        &mut self,
        generation: usize,
        rng: &mut GenomeRng,
    ) -> Result<Fitness, EvaluationError> {
        self.fitness = None;
        let fitness = self.genome.compute_fitness(generation, rng)?;
        if !fitness.is_finite() {
            return Err(EvaluationError::NonFiniteFitness { fitness });
        }
        // -0.0 and 0.0 rank as ties
        let fitness = fitness + 0.0;
        self.fitness = Some(fitness);
        Ok(fitness)
    }

    /// Clones the genome, resets it, and wraps it in a new unevaluated individual.
    ///
    /// This is how elites survive into the next generation: they keep their
    /// parameters but are evaluated again.
    #[must_use]
    pub fn reset_clone(&self) -> Self {
        let mut genome = self.genome.clone();
        genome.reset();
        Self::new(genome)
    }

    pub(crate) fn init(&mut self, params: &G::Params) -> Result<(), ConfigError> {
        self.fitness = None;
        self.genome.init(params)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::testing::TestGenome;

    #[test]
    fn test_new_individual_is_not_evaluated() {
        let individual = Individual::new(TestGenome::new(vec![0.5]));
        assert!(!individual.is_evaluated());
        assert_eq!(individual.try_fitness(), None);
    }

    #[test]
    #[should_panic(expected = "before the individual was evaluated")]
    fn test_fitness_before_evaluation_panics() {
        let individual = Individual::new(TestGenome::new(vec![0.5]));
        let _ = individual.fitness();
    }

    #[test]
    fn test_evaluate_caches_fitness() {
        let mut individual = Individual::new(TestGenome::new(vec![0.2, 0.4]));
        let mut rng = GenomeRng::seed_from_u64(0);
        let fitness = individual.evaluate(0, &mut rng).unwrap();
        assert!((fitness - 0.3).abs() < 1e-12);
        assert_eq!(individual.fitness(), fitness);
        assert_eq!(individual.genome().evaluations, 1);
    }

    #[test]
    fn test_evaluate_stores_negative_zero_as_zero() {
        let mut individual = Individual::new(TestGenome::with_fitness(-0.0));
        let mut rng = GenomeRng::seed_from_u64(0);
        let fitness = individual.evaluate(0, &mut rng).unwrap();
        assert!(fitness.is_sign_positive());
        assert!(individual.fitness().is_sign_positive());
    }

    #[test]
    fn test_evaluate_rejects_non_finite_fitness() {
        let mut individual = Individual::new(TestGenome::with_fitness(f64::NAN));
        let mut rng = GenomeRng::seed_from_u64(0);
        let error = individual.evaluate(0, &mut rng).unwrap_err();
        assert!(matches!(error, EvaluationError::NonFiniteFitness { .. }));
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_reset_clone_keeps_parameters_and_clears_state() {
        let mut individual = Individual::new(TestGenome::new(vec![0.1, 0.9]));
        let mut rng = GenomeRng::seed_from_u64(0);
        individual.evaluate(0, &mut rng).unwrap();
        assert!(individual.genome().dirty);

        let clone = individual.reset_clone();
        assert_eq!(clone.genome().values, individual.genome().values);
        assert!(!clone.genome().dirty);
        assert!(!clone.is_evaluated());
        // the original is untouched
        assert!(individual.genome().dirty);
        assert!(individual.is_evaluated());
    }
}
