//! A small 2D driving simulation.
//!
//! A [`World`] is a rectangular area scattered with circular obstacles, generated
//! deterministically from a seed. A [`Car`] moves through it with simple kinematics,
//! senses obstacles with raycasts and crashes when its bounding circle touches an
//! obstacle or the world boundary. A [`Simulation`] drives a car with a
//! [`Controller`] until it reaches its destination, crashes or runs out of time.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use neurocar_sim::{Car, CarDef, Controller, Controls, Simulation, SimulationDef, Vec2, World};
//!
//! struct FullThrottle;
//!
//! impl Controller for FullThrottle {
//!     type Error = Infallible;
//!
//!     fn controls(&mut self, _car: &Car, _sim: &Simulation<'_>) -> Result<Controls, Infallible> {
//!         Ok(Controls {
//!             accelerate: true,
//!             ..Controls::default()
//!         })
//!     }
//! }
//!
//! let world = World::new(500.0, 500.0, vec![]).unwrap();
//! let simulation = Simulation::new(&world, Vec2::new(475.0, 250.0), SimulationDef::default());
//! let mut car = Car::new(CarDef::default());
//!
//! let outcome = simulation.drive(&mut car, &mut FullThrottle).unwrap();
//! assert!(outcome.end.is_reached());
//! ```

pub use self::{car::*, geometry::*, simulation::*, world::*};

pub mod car;
pub mod geometry;
pub mod simulation;
pub mod world;
