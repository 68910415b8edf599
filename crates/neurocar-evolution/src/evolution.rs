//! The generational loop.
//!
//! [`Evolution::evolve`] runs, for each generation `g` in `0..=generations`:
//!
//! 1. the pre-generation hook with the unevaluated population,
//! 2. fitness evaluation of every individual on the worker threads,
//! 3. the post-generation hook with the evaluated population,
//! 4. reproduction into generation `g + 1`, except after the last generation.
//!
//! The returned population is therefore always evaluated. With `generations == 0` the
//! initial population is evaluated once, each hook fires once and no reproduction
//! takes place.

use std::{num::NonZeroUsize, thread};

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, EvolveError, Genome, HookError, HookStage, Population, PopulationEvolver,
    SelectionMethod, rng,
};

/// Engine configuration of an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Probability of mutating each parameter of an offspring, in `[0, 1]`
    pub mutation_rate: f64,
    /// Number of top individuals carried over to the next generation
    pub elite_count: usize,
    /// Parent selection method
    pub selection: SelectionMethod,
    /// Master seed all randomness of the run derives from
    pub seed: u64,
    /// Number of worker threads evaluating fitness
    pub threads: usize,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            mutation_rate: 0.01,
            elite_count: 1,
            selection: SelectionMethod::default(),
            seed: 0,
            threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

impl EvolutionParams {
    /// Checks the parameters against a population of `population_size` individuals.
    pub fn validate(&self, population_size: usize) -> Result<(), ConfigError> {
        if population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRateOutOfRange {
                rate: self.mutation_rate,
            });
        }
        if self.elite_count > population_size {
            return Err(ConfigError::EliteCountTooLarge {
                elite_count: self.elite_count,
                population_size,
            });
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        self.selection.validate()
    }
}

/// Callback observing the population of a generation.
///
/// Receives the generation index and a read-only view of the population. Errors abort
/// the run.
pub type GenerationHook<'h, G> =
    Box<dyn FnMut(usize, &Population<G>) -> Result<(), HookError> + 'h>;

fn noop_hook<'h, G>() -> GenerationHook<'h, G> {
    Box::new(|_: usize, _: &Population<G>| Ok(()))
}

/// Drives populations of `G` through the generational loop.
pub struct Evolution<'h, G>
where
    G: Genome,
{
    params: EvolutionParams,
    genome_params: G::Params,
    pre_generation_hook: GenerationHook<'h, G>,
    post_generation_hook: GenerationHook<'h, G>,
}

impl<'h, G> Evolution<'h, G>
where
    G: Genome,
{
    /// Creates a driver with no-op hooks.
    ///
    /// `genome_params` is passed to [`Genome::init`] for every genome of the initial
    /// population.
    pub fn new(params: EvolutionParams, genome_params: G::Params) -> Self {
        Self {
            params,
            genome_params,
            pre_generation_hook: noop_hook(),
            post_generation_hook: noop_hook(),
        }
    }

    /// Sets the hook called before each generation's evaluation.
    #[must_use]
    pub fn with_pre_generation_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize, &Population<G>) -> Result<(), HookError> + 'h,
    {
        self.pre_generation_hook = Box::new(hook);
        self
    }

    /// Sets the hook called after each generation's evaluation.
    ///
    /// The hook sees the evaluated population, so it can report fitness statistics or
    /// persist the best genome.
    #[must_use]
    pub fn with_post_generation_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize, &Population<G>) -> Result<(), HookError> + 'h,
    {
        self.post_generation_hook = Box::new(hook);
        self
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    #[must_use]
    pub fn genome_params(&self) -> &G::Params {
        &self.genome_params
    }

    /// Evolves `initial` for `generations` reproduction steps.
    ///
    /// Parameters are validated and every genome is initialized before the first
    /// generation runs. The first failure aborts the run.
    pub fn evolve(
        &mut self,
        initial: Population<G>,
        generations: usize,
    ) -> Result<Population<G>, EvolveError> {
        self.params.validate(initial.len())?;
        let threads = NonZeroUsize::new(self.params.threads).ok_or(ConfigError::ZeroThreads)?;

        let mut population = initial;
        population.init_genomes(&self.genome_params)?;

        let evolver = PopulationEvolver::from_params(&self.params);
        let mut rng = rng::driver_rng(self.params.seed);
        log::debug!(
            "evolving {} individuals for {generations} generations on {threads} threads",
            population.len()
        );

        for generation in 0..=generations {
            (self.pre_generation_hook)(generation, &population).map_err(|source| {
                EvolveError::Hook {
                    generation,
                    stage: HookStage::PreGeneration,
                    source,
                }
            })?;

            population.evaluate(generation, self.params.seed, threads)?;
            if log::log_enabled!(log::Level::Debug) {
                let stats = population.compute_fitness_stats();
                log::debug!(
                    "generation {generation}: best {:.6}, mean {:.6}, worst {:.6}",
                    stats.max,
                    stats.mean,
                    stats.min
                );
            }

            (self.post_generation_hook)(generation, &population).map_err(|source| {
                EvolveError::Hook {
                    generation,
                    stage: HookStage::PostGeneration,
                    source,
                }
            })?;

            if generation < generations {
                population = evolver.evolve(&population, &mut rng);
            }
        }

        Ok(population)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{EvaluationError, testing::TestGenome};

    fn params(elite_count: usize, mutation_rate: f64, threads: usize) -> EvolutionParams {
        EvolutionParams {
            mutation_rate,
            elite_count,
            selection: SelectionMethod::Roulette,
            seed: 1234,
            threads,
        }
    }

    fn initial(count: usize) -> Population<TestGenome> {
        Population::random(&TestGenome::new(vec![0.0; 5]), count, 77).unwrap()
    }

    fn values(population: &Population<TestGenome>) -> Vec<Vec<f64>> {
        population.genomes().map(|g| g.values.clone()).collect()
    }

    #[test]
    fn test_population_size_is_invariant() {
        let sizes = RefCell::new(vec![]);
        let mut evolution = Evolution::<TestGenome>::new(params(2, 0.1, 2), 5)
            .with_pre_generation_hook(|_, p| {
                sizes.borrow_mut().push(p.len());
                Ok(())
            })
            .with_post_generation_hook(|_, p| {
                sizes.borrow_mut().push(p.len());
                Ok(())
            });
        let population = evolution.evolve(initial(9), 6).unwrap();
        assert_eq!(population.len(), 9);
        drop(evolution);
        let sizes = sizes.into_inner();
        assert_eq!(sizes.len(), 14);
        assert!(sizes.iter().all(|&s| s == 9));
    }

    #[test]
    fn test_zero_generations_evaluates_once() {
        let mut pre_calls = vec![];
        let mut evolution =
            Evolution::<TestGenome>::new(params(1, 0.5, 3), 5).with_pre_generation_hook(|g, p| {
                assert!(!p.is_evaluated());
                pre_calls.push(g);
                Ok(())
            });
        let start = initial(6);
        let expected = values(&start);
        let population = evolution.evolve(start, 0).unwrap();
        drop(evolution);

        assert_eq!(pre_calls, vec![0]);
        assert!(population.is_evaluated());
        assert!(population.genomes().all(|g| g.evaluations == 1));
        assert!(population.genomes().all(|g| g.initialized));
        assert_eq!(values(&population), expected);
    }

    #[test]
    fn test_elites_reappear_in_next_generation() {
        let best_by_generation = RefCell::new(Vec::<Vec<Vec<f64>>>::new());
        let first_by_generation = RefCell::new(Vec::<Vec<Vec<f64>>>::new());
        let elite_count = 3;
        let mut evolution = Evolution::<TestGenome>::new(params(elite_count, 0.3, 1), 5)
            .with_pre_generation_hook(|_, p| {
                first_by_generation
                    .borrow_mut()
                    .push(values(p).into_iter().take(elite_count).collect());
                assert!(p.genomes().all(|g| !g.dirty));
                Ok(())
            })
            .with_post_generation_hook(|_, p| {
                let ranking = p.ranking();
                best_by_generation.borrow_mut().push(
                    ranking[..elite_count]
                        .iter()
                        .map(|&i| p.individuals()[i].genome().values.clone())
                        .collect(),
                );
                Ok(())
            });
        evolution.evolve(initial(10), 5).unwrap();
        drop(evolution);

        let best = best_by_generation.into_inner();
        let first = first_by_generation.into_inner();
        for g in 0..5 {
            assert_eq!(best[g], first[g + 1], "generation {g}");
        }
    }

    #[test]
    fn test_best_fitness_never_decreases_with_elitism() {
        let mut best = vec![];
        let mut evolution =
            Evolution::<TestGenome>::new(params(1, 0.2, 4), 5).with_post_generation_hook(|_, p| {
                best.push(p.best().fitness());
                Ok(())
            });
        evolution.evolve(initial(8), 20).unwrap();
        drop(evolution);
        assert_eq!(best.len(), 21);
        assert!(best.windows(2).all(|w| w[1] >= w[0]), "{best:?}");
    }

    #[test]
    fn test_runs_are_deterministic_for_any_thread_count() {
        let run = |threads| {
            let template = TestGenome {
                noisy: true,
                ..TestGenome::new(vec![0.0; 5])
            };
            let population = Population::random(&template, 11, 5).unwrap();
            let mut evolution = Evolution::<TestGenome>::new(params(2, 0.1, threads), 5);
            let population = evolution.evolve(population, 8).unwrap();
            let fitness = population
                .individuals()
                .iter()
                .map(|ind| ind.fitness())
                .collect::<Vec<_>>();
            (values(&population), fitness)
        };
        let single = run(1);
        assert_eq!(single, run(1));
        assert_eq!(single, run(4));
    }

    #[test]
    fn test_single_individual_is_cloned_every_generation() {
        let mut evolution = Evolution::<TestGenome>::new(params(1, 1.0, 1), 5);
        let start = initial(1);
        let expected = values(&start);
        let population = evolution.evolve(start, 4).unwrap();
        assert_eq!(values(&population), expected);
        assert_eq!(population.individuals()[0].genome().evaluations, 5);
    }

    #[test]
    fn test_invalid_params_are_rejected_before_any_generation() {
        let cases = [
            (
                params(11, 0.1, 1),
                ConfigError::EliteCountTooLarge {
                    elite_count: 11,
                    population_size: 10,
                },
            ),
            (
                params(1, 1.5, 1),
                ConfigError::MutationRateOutOfRange { rate: 1.5 },
            ),
            (
                params(1, -0.1, 1),
                ConfigError::MutationRateOutOfRange { rate: -0.1 },
            ),
            (params(1, 0.1, 0), ConfigError::ZeroThreads),
            (
                EvolutionParams {
                    selection: SelectionMethod::Tournament { size: 0 },
                    ..params(1, 0.1, 1)
                },
                ConfigError::TournamentSizeZero,
            ),
        ];
        for (params, expected) in cases {
            let mut hook_called = false;
            let mut evolution = Evolution::<TestGenome>::new(params, 5).with_pre_generation_hook(|_, _| {
                hook_called = true;
                Ok(())
            });
            let error = evolution.evolve(initial(10), 3).unwrap_err();
            drop(evolution);
            assert!(matches!(error, EvolveError::Config(ref e) if *e == expected));
            assert!(!hook_called);
        }
    }

    #[test]
    fn test_genome_init_failure_is_a_config_error() {
        let mut evolution = Evolution::<TestGenome>::new(params(1, 0.1, 1), 4);
        let error = evolution.evolve(initial(3), 1).unwrap_err();
        assert!(matches!(
            error,
            EvolveError::Config(ConfigError::Genome { .. })
        ));
    }

    #[test]
    fn test_evaluation_failure_aborts_run() {
        let template = TestGenome {
            fail_at_generation: Some(2),
            ..TestGenome::new(vec![0.0; 5])
        };
        let population = Population::random(&template, 4, 1).unwrap();
        let mut post_calls = vec![];
        let mut evolution =
            Evolution::<TestGenome>::new(params(1, 0.1, 2), 5).with_post_generation_hook(|g, _| {
                post_calls.push(g);
                Ok(())
            });
        let error = evolution.evolve(population, 10).unwrap_err();
        drop(evolution);

        assert_eq!(post_calls, vec![0, 1]);
        match error {
            EvolveError::Evaluation {
                generation, index, ..
            } => {
                assert_eq!(generation, 2);
                assert_eq!(index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hook_failure_aborts_run() {
        let mut evolution =
            Evolution::<TestGenome>::new(params(1, 0.1, 1), 5).with_post_generation_hook(|g, _| {
                if g == 1 {
                    Err(HookError::new("cannot save"))
                } else {
                    Ok(())
                }
            });
        let error = evolution.evolve(initial(4), 5).unwrap_err();
        assert!(matches!(
            error,
            EvolveError::Hook {
                generation: 1,
                stage: HookStage::PostGeneration,
                ..
            }
        ));
    }

    #[test]
    fn test_params_serialization_uses_defaults() {
        let params: EvolutionParams =
            serde_json::from_str(r#"{"mutation_rate":0.2,"seed":9}"#).unwrap();
        assert_eq!(params.mutation_rate, 0.2);
        assert_eq!(params.seed, 9);
        assert_eq!(params.elite_count, 1);
        assert_eq!(params.selection, SelectionMethod::Roulette);
        assert!(params.threads >= 1);
    }

    #[test]
    fn test_evaluation_error_is_not_swallowed_by_hooks() {
        let template = TestGenome {
            fixed_fitness: Some(f64::INFINITY),
            ..TestGenome::new(vec![0.0; 5])
        };
        let population = Population::new([template]).unwrap();
        let mut evolution = Evolution::<TestGenome>::new(params(0, 0.1, 1), 5);
        let error = evolution.evolve(population, 0).unwrap_err();
        assert!(matches!(
            error,
            EvolveError::Evaluation {
                source: EvaluationError::NonFiniteFitness { .. },
                ..
            }
        ));
    }
}
