//! Genome implementations for the evolution engine.
//!
//! - [`EvolvingString`]: evolves a random string toward a target phrase. Useful to see
//!   the engine converge in a few hundred generations.
//! - [`SelfDrivingCar`]: a neural network driving a car through a generated world
//!   toward a destination.
//!
//! # Example
//!
//! ```
//! use neurocar_evolution::{Evolution, EvolutionParams, Population, SelectionMethod};
//! use neurocar_genomes::EvolvingString;
//!
//! let template = EvolvingString::new("hello");
//! let population = Population::random(&template, 100, 1).unwrap();
//! let params = EvolutionParams {
//!     elite_count: 2,
//!     selection: SelectionMethod::Tournament { size: 3 },
//!     ..EvolutionParams::default()
//! };
//! let mut evolution = Evolution::new(params, ());
//! let population = evolution.evolve(population, 50).unwrap();
//! assert!(population.best().fitness() > 0.5);
//! ```

pub use self::{evolving_string::*, neuro_controller::*, self_driving_car::*};

pub mod evolving_string;
pub mod neuro_controller;
pub mod self_driving_car;
