//! Minimal genome used by the engine's unit tests.

use rand::Rng;

use crate::{ConfigError, EvaluationError, Fitness, Genome, GenomeRng};

/// Real-valued genome whose fitness is the mean of its values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestGenome {
    pub(crate) values: Vec<f64>,
    pub(crate) fixed_fitness: Option<Fitness>,
    pub(crate) fail_at_generation: Option<usize>,
    pub(crate) noisy: bool,
    /// Set by evaluation, cleared by reset.
    pub(crate) dirty: bool,
    pub(crate) initialized: bool,
    pub(crate) evaluations: usize,
}

impl TestGenome {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            fixed_fitness: None,
            fail_at_generation: None,
            noisy: false,
            dirty: false,
            initialized: false,
            evaluations: 0,
        }
    }

    pub(crate) fn with_fitness(fitness: Fitness) -> Self {
        Self {
            fixed_fitness: Some(fitness),
            ..Self::new(vec![fitness])
        }
    }
}

impl Genome for TestGenome {
    /// Required number of values.
    type Params = usize;

    fn init(&mut self, params: &usize) -> Result<(), ConfigError> {
        if self.values.len() != *params {
            return Err(ConfigError::genome(format!(
                "expected {params} values, got {}",
                self.values.len()
            )));
        }
        self.initialized = true;
        Ok(())
    }

    fn randomize(&mut self, seed: u64) {
        let mut rng = <GenomeRng as rand::SeedableRng>::seed_from_u64(seed);
        for v in &mut self.values {
            *v = rng.random_range(0.0..1.0);
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn compute_fitness(
        &mut self,
        generation: usize,
        rng: &mut GenomeRng,
    ) -> Result<Fitness, EvaluationError> {
        if self.fail_at_generation == Some(generation) {
            return Err(EvaluationError::simulation("requested failure"));
        }
        self.dirty = true;
        self.evaluations += 1;
        let mut fitness = self
            .fixed_fitness
            .unwrap_or_else(|| self.values.iter().sum::<f64>() / self.values.len() as f64);
        if self.noisy {
            fitness += rng.random_range(0.0..1e-3);
        }
        Ok(fitness)
    }

    fn reset(&mut self) {
        self.dirty = false;
    }

    fn crossover<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let values = self
            .values
            .iter()
            .zip(&partner.values)
            .map(|(a, b)| if rng.random_bool(0.5) { *a } else { *b })
            .collect();
        Self {
            values,
            ..self.clone()
        }
    }

    fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for v in &mut self.values {
            if rng.random_bool(rate) {
                *v += rng.random_range(0.01..0.1);
            }
        }
    }
}
