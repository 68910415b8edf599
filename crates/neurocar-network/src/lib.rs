//! Feed-forward neural networks evolved by genetic operators.
//!
//! A [`NeuralNetwork`] is a stack of fully-connected layers with sigmoid activation.
//! Instead of being trained by gradient descent, its parameters are evolved: the
//! [`NeuralNetwork::crossover`] and [`NeuralNetwork::mutate`] operators are the
//! building blocks of genomes that carry a network.
//!
//! # Example
//!
//! ```
//! use neurocar_network::NeuralNetwork;
//! use rand::SeedableRng as _;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let network = NeuralNetwork::random(&[3, 4, 2], &mut rng).unwrap();
//! let outputs = network.compute(&[0.1, 0.5, -0.3]).unwrap();
//! assert_eq!(outputs.len(), 2);
//! assert!(outputs.iter().all(|o| (0.0..=1.0).contains(o)));
//! ```

pub use self::network::*;

pub mod network;
pub mod operators;
