//! Genetic operators on parameter vectors.
//!
//! These functions work on plain `f64` slices and are used by
//! [`NeuralNetwork`](crate::NeuralNetwork) for each weight matrix and bias vector.
//!
//! - **Crossover**: [`uniform_crossover`] picks every parameter from either parent with a
//!   fair coin
//! - **Mutation**: [`mutate`] adds a bounded, never-zero perturbation to each parameter
//!   with probability `rate`
//!
//! # Perturbation
//!
//! The magnitude of a perturbation is drawn uniformly from `[strength / 10, strength]`
//! and its sign from a fair coin. The distribution is symmetric and bounded, and a
//! mutated parameter always differs from its previous value.

use rand::Rng;

/// Smallest perturbation magnitude, relative to the mutation strength.
pub const MIN_PERTURBATION_RATIO: f64 = 0.1;

/// Creates a parameter vector by applying a function to each index.
///
/// # Examples
///
/// ```
/// use neurocar_network::operators;
///
/// let values = operators::from_fn(|i| i as f64 * 0.5, 3);
/// assert_eq!(values, vec![0.0, 0.5, 1.0]);
/// ```
pub fn from_fn<F>(mut f: F, len: usize) -> Vec<f64>
where
    F: FnMut(usize) -> f64,
{
    let mut values = Vec::with_capacity(len);
    for i in 0..len {
        values.push(f(i));
    }
    values
}

/// Performs uniform crossover between two parent parameter vectors.
///
/// Every parameter of the offspring is copied from `p1` or `p2` with equal probability.
///
/// # Panics
///
/// Panics if parent vectors have different lengths.
pub fn uniform_crossover<R>(p1: &[f64], p2: &[f64], rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    from_fn(
        |i| if rng.random_bool(0.5) { p1[i] } else { p2[i] },
        p1.len(),
    )
}

/// Draws a perturbation with magnitude in `[strength / 10, strength]` and random sign.
///
/// # Panics
///
/// Panics if `strength` is not a positive finite number.
pub fn perturbation<R>(strength: f64, rng: &mut R) -> f64
where
    R: Rng + ?Sized,
{
    assert!(
        strength > 0.0 && strength.is_finite(),
        "mutation strength must be positive"
    );
    let magnitude = rng.random_range(strength * MIN_PERTURBATION_RATIO..=strength);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Mutates a parameter vector in-place.
///
/// Each parameter is perturbed with probability `rate`. A rate of `0.0` leaves the
/// values untouched and a rate of `1.0` perturbs all of them.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]` or `strength` is not positive.
pub fn mutate<R>(values: &mut [f64], rate: f64, strength: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for v in values {
        if rng.random_bool(rate) {
            *v += perturbation(strength, rng);
        }
    }
}
