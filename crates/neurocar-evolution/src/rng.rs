//! Deterministic random number generation for evolution runs.
//!
//! A run owns no global generator. The driver draws selection, crossover and mutation
//! randomness from [`driver_rng`], and every fitness evaluation receives its own
//! generator from [`individual_rng`], partitioned by generation and population index.
//! Initial randomization uses a third stream, [`init_seed`], so no genome's parameters
//! are correlated with its first evaluation.
//! Because the partition does not depend on which worker evaluates an individual, a run
//! produces the same result for any number of threads.

use rand::SeedableRng as _;
use rand_pcg::Pcg64;

/// Random number generator handed to genomes.
pub type GenomeRng = Pcg64;

const DRIVER_STREAM: u64 = 0xD1B5_4A32_D192_ED03;
const INIT_STREAM: u64 = 0x6A09_E667_F3BC_C909;

/// `SplitMix64` finalizer, used to decorrelate nearby seeds.
#[must_use]
pub const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives the seed of one individual's evaluation from the master seed.
#[must_use]
pub fn derive_seed(master: u64, generation: usize, index: usize) -> u64 {
    let generation_seed = splitmix64(splitmix64(master) ^ generation as u64);
    splitmix64(generation_seed ^ index as u64)
}

/// Seed used to randomize individual `index` of the initial population.
#[must_use]
pub fn init_seed(master: u64, index: usize) -> u64 {
    splitmix64(splitmix64(master ^ INIT_STREAM) ^ index as u64)
}

/// Generator used by the driver for selection, crossover and mutation.
#[must_use]
pub fn driver_rng(master: u64) -> GenomeRng {
    GenomeRng::seed_from_u64(splitmix64(master ^ DRIVER_STREAM))
}

/// Generator used for the evaluation of individual `index` in `generation`.
#[must_use]
pub fn individual_rng(master: u64, generation: usize, index: usize) -> GenomeRng {
    GenomeRng::seed_from_u64(derive_seed(master, generation, index))
}
