use std::{num::NonZeroUsize, panic, thread};

use neurocar_stats::descriptive::DescriptiveStats;

use crate::{ConfigError, EvolveError, Genome, GenomeRng, Individual, rng};

/// The individuals of one generation.
///
/// A population is never empty and its size stays constant across the generations of
/// an evolution run.
#[derive(Debug, Clone)]
pub struct Population<G> {
    individuals: Vec<Individual<G>>,
}

impl<G> Population<G>
where
    G: Genome,
{
    /// Creates a population from unevaluated genomes.
    pub fn new<I>(genomes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = G>,
    {
        let individuals = genomes
            .into_iter()
            .map(Individual::new)
            .collect::<Vec<_>>();
        if individuals.is_empty() {
            return Err(ConfigError::EmptyPopulation);
        }
        Ok(Self { individuals })
    }

    /// Creates `count` randomized clones of `template`.
    ///
    /// Individual `i` is randomized with [`rng::init_seed`] of `seed` and `i`, so the same
    /// arguments always produce the same population.
    pub fn random(template: &G, count: usize, seed: u64) -> Result<Self, ConfigError> {
        Self::new((0..count).map(|i| {
            let mut genome = template.clone();
            genome.randomize(rng::init_seed(seed, i));
            genome
        }))
    }

    pub(crate) fn from_individuals(individuals: Vec<Individual<G>>) -> Self {
        assert!(!individuals.is_empty());
        Self { individuals }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Always `false`; provided for API symmetry with [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual<G>] {
        &self.individuals
    }

    pub fn genomes(&self) -> impl Iterator<Item = &G> + '_ {
        self.individuals.iter().map(Individual::genome)
    }

    #[must_use]
    pub fn into_genomes(self) -> Vec<G> {
        self.individuals
            .into_iter()
            .map(Individual::into_genome)
            .collect()
    }

    /// Returns `true` if every individual has a cached fitness.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.individuals.iter().all(Individual::is_evaluated)
    }

    /// Returns the indices of the individuals ordered by fitness, best first.
    ///
    /// The sort is stable: individuals with equal fitness keep their relative order.
    ///
    /// # Panics
    ///
    /// Panics if any individual is not evaluated.
    #[must_use]
    pub fn ranking(&self) -> Vec<usize> {
        let mut indices = (0..self.individuals.len()).collect::<Vec<_>>();
        indices.sort_by(|&a, &b| {
            let fa = self.individuals[a].fitness();
            let fb = self.individuals[b].fitness();
            fb.total_cmp(&fa)
        });
        indices
    }

    /// Returns the individual with the highest fitness.
    ///
    /// On ties the first one in population order wins.
    ///
    /// # Panics
    ///
    /// Panics if any individual is not evaluated.
    #[must_use]
    pub fn best(&self) -> &Individual<G> {
        &self.individuals[self.ranking()[0]]
    }

    /// Computes descriptive statistics for fitness across all individuals.
    ///
    /// # Panics
    ///
    /// Panics if any individual is not evaluated.
    #[must_use]
    pub fn compute_fitness_stats(&self) -> DescriptiveStats {
        DescriptiveStats::new(self.individuals.iter().map(Individual::fitness))
            .expect("population is never empty")
    }

    pub(crate) fn init_genomes(&mut self, params: &G::Params) -> Result<(), ConfigError> {
        for individual in &mut self.individuals {
            individual.init(params)?;
        }
        Ok(())
    }

    /// Evaluates fitness for all individuals on `threads` workers.
    ///
    /// The population is split into one contiguous chunk per worker and the call returns
    /// once every worker has finished. When several individuals fail, the error of the
    /// lowest index is reported.
    pub(crate) fn evaluate(
        &mut self,
        generation: usize,
        seed: u64,
        threads: NonZeroUsize,
    ) -> Result<(), EvolveError> {
        let chunk_size = self.individuals.len().div_ceil(threads.get());
        if chunk_size == self.individuals.len() {
            return evaluate_chunk(&mut self.individuals, 0, generation, seed);
        }

        let results = thread::scope(|s| {
            let handles = self
                .individuals
                .chunks_mut(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| {
                    let offset = chunk_index * chunk_size;
                    s.spawn(move || evaluate_chunk(chunk, offset, generation, seed))
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });
        results.into_iter().collect()
    }
}

fn evaluate_chunk<G>(
    chunk: &mut [Individual<G>],
    offset: usize,
    generation: usize,
    seed: u64,
) -> Result<(), EvolveError>
where
    G: Genome,
{
    for (i, individual) in chunk.iter_mut().enumerate() {
        let index = offset + i;
        let mut rng: GenomeRng = rng::individual_rng(seed, generation, index);
        let fitness = individual
            .evaluate(generation, &mut rng)
            .map_err(|source| EvolveError::Evaluation {
                generation,
                index,
                source,
            })?;
        log::trace!("generation {generation}: individual #{index} => {fitness:.6}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EvaluationError, testing::TestGenome};

    fn threads(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_empty_population_is_rejected() {
        let result = Population::<TestGenome>::new(vec![]);
        assert!(matches!(result, Err(ConfigError::EmptyPopulation)));
    }

    #[test]
    fn test_random_population_is_reproducible() {
        let template = TestGenome::new(vec![0.0; 4]);
        let a = Population::random(&template, 5, 11).unwrap();
        let b = Population::random(&template, 5, 11).unwrap();
        assert_eq!(a.len(), 5);
        assert!(a.genomes().eq(b.genomes()));
        assert_ne!(a.individuals()[0].genome(), a.individuals()[1].genome());
    }

    #[test]
    fn test_ranking_is_stable_and_descending() {
        let mut population = Population::new(
            [0.5, 0.9, 0.5, 0.1, 0.9]
                .into_iter()
                .map(TestGenome::with_fitness),
        )
        .unwrap();
        population.evaluate(0, 0, threads(1)).unwrap();
        assert_eq!(population.ranking(), vec![1, 4, 0, 2, 3]);
        assert!(std::ptr::eq(population.best(), &population.individuals()[1]));
    }

    #[test]
    fn test_signed_zeros_tie_in_ranking() {
        let mut population =
            Population::new([-0.0, 0.0].into_iter().map(TestGenome::with_fitness)).unwrap();
        population.evaluate(0, 0, threads(1)).unwrap();
        assert_eq!(population.ranking(), vec![0, 1]);
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential() {
        let template = TestGenome {
            noisy: true,
            ..TestGenome::new(vec![0.0; 3])
        };
        let mut sequential = Population::random(&template, 13, 3).unwrap();
        let mut parallel = sequential.clone();
        sequential.evaluate(4, 99, threads(1)).unwrap();
        parallel.evaluate(4, 99, threads(4)).unwrap();

        let fitness = |p: &Population<TestGenome>| {
            p.individuals()
                .iter()
                .map(Individual::fitness)
                .collect::<Vec<_>>()
        };
        assert_eq!(fitness(&sequential), fitness(&parallel));
        assert!(parallel.is_evaluated());
        assert!(parallel.genomes().all(|g| g.evaluations == 1));
    }

    #[test]
    fn test_more_threads_than_individuals() {
        let mut population =
            Population::new([0.1, 0.2].into_iter().map(TestGenome::with_fitness)).unwrap();
        population.evaluate(0, 0, threads(16)).unwrap();
        assert!(population.is_evaluated());
    }

    #[test]
    fn test_evaluation_error_reports_lowest_failing_index() {
        let genomes = (0..8).map(|i| TestGenome {
            fail_at_generation: (i == 2 || i == 6).then_some(5),
            ..TestGenome::with_fitness(1.0)
        });
        let mut population = Population::new(genomes).unwrap();
        let error = population.evaluate(5, 0, threads(4)).unwrap_err();
        match error {
            EvolveError::Evaluation {
                generation,
                index,
                source,
            } => {
                assert_eq!(generation, 5);
                assert_eq!(index, 2);
                assert!(matches!(source, EvaluationError::Simulation { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fitness_stats() {
        let mut population =
            Population::new([1.0, 2.0, 3.0].into_iter().map(TestGenome::with_fitness)).unwrap();
        population.evaluate(0, 0, threads(2)).unwrap();
        let stats = population.compute_fitness_stats();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.mean, 2.0);
    }
}
