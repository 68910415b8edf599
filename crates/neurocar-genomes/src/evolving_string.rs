use std::{fmt, sync::Arc};

use neurocar_evolution::{ConfigError, EvaluationError, Fitness, Genome, GenomeRng};
use rand::{Rng, SeedableRng as _, seq::IndexedRandom as _};

/// Characters a gene can take.
pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

fn random_char<R>(rng: &mut R) -> char
where
    R: Rng + ?Sized,
{
    ALPHABET.as_bytes().choose(rng).map_or(' ', |&b| char::from(b))
}

/// Draws an alphabet character different from `current`.
fn other_char<R>(current: char, rng: &mut R) -> char
where
    R: Rng + ?Sized,
{
    let alphabet = ALPHABET.as_bytes();
    let Some(pos) = alphabet.iter().position(|&b| char::from(b) == current) else {
        return random_char(rng);
    };
    let i = rng.random_range(0..alphabet.len() - 1);
    char::from(alphabet[if i >= pos { i + 1 } else { i }])
}

/// A string evolving toward a target phrase.
///
/// Fitness is the fraction of positions where the genes match the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolvingString {
    target: Arc<str>,
    genes: Vec<char>,
}

impl EvolvingString {
    /// Creates a genome for `target` whose genes are all spaces.
    pub fn new<S>(target: S) -> Self
    where
        S: Into<Arc<str>>,
    {
        let target = target.into();
        let genes = vec![' '; target.chars().count()];
        Self { target, genes }
    }

    /// Creates a genome with explicit genes.
    pub fn with_genes<S>(target: S, genes: &str) -> Self
    where
        S: Into<Arc<str>>,
    {
        Self {
            target: target.into(),
            genes: genes.chars().collect(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn genes(&self) -> String {
        self.genes.iter().collect()
    }

    #[must_use]
    pub fn matching(&self) -> usize {
        self.genes
            .iter()
            .zip(self.target.chars())
            .filter(|(g, t)| *g == t)
            .count()
    }
}

impl fmt::Display for EvolvingString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.genes {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Genome for EvolvingString {
    type Params = ();

    fn init(&mut self, _params: &()) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::genome("target string must not be empty"));
        }
        if let Some(c) = self.target.chars().find(|c| !ALPHABET.contains(*c)) {
            return Err(ConfigError::genome(format!(
                "target contains {c:?}, which is not in the gene alphabet"
            )));
        }
        let len = self.target.chars().count();
        if self.genes.len() != len {
            return Err(ConfigError::genome(format!(
                "genes have {} characters, target has {len}",
                self.genes.len()
            )));
        }
        Ok(())
    }

    fn randomize(&mut self, seed: u64) {
        let mut rng = GenomeRng::seed_from_u64(seed);
        for g in &mut self.genes {
            *g = random_char(&mut rng);
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn compute_fitness(
        &mut self,
        _generation: usize,
        _rng: &mut GenomeRng,
    ) -> Result<Fitness, EvaluationError> {
        if self.genes.is_empty() {
            return Err(EvaluationError::MissingSubject);
        }
        Ok(self.matching() as f64 / self.genes.len() as f64)
    }

    fn reset(&mut self) {}

    fn crossover<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            self.genes.len(),
            partner.genes.len(),
            "crossover requires genomes of the same length"
        );
        let genes = self
            .genes
            .iter()
            .zip(&partner.genes)
            .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
            .collect();
        Self {
            target: Arc::clone(&self.target),
            genes,
        }
    }

    fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for g in &mut self.genes {
            if rng.random_bool(rate) {
                *g = other_char(*g, rng);
            }
        }
    }
}
