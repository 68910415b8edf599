//! Neural-network-driven cars.
//!
//! A [`SelfDrivingCar`] genome carries the parameters of a [`NeuralNetwork`]. Its
//! fitness is measured by driving a car through a world generated for the current
//! generation and comparing the remaining distance to the destination with the
//! distance from the start:
//!
//! ```text
//! fitness = clamp(1 - remaining / (|destination - start|), 0, 1)
//! ```
//!
//! The world changes every [`VehicleParams::world_seed_change_interval`] generations so
//! that networks generalize instead of memorizing one obstacle layout.

use std::sync::Arc;

use neurocar_evolution::{ConfigError, EvaluationError, Fitness, Genome, GenomeRng};
use neurocar_network::{NeuralNetwork, ShapeError};
use neurocar_sim::{Car, CarDef, DriveOutcome, Simulation, SimulationDef, Vec2, World, WorldDef};
use rand::{Rng, SeedableRng as _};
use serde::{Deserialize, Serialize};

use crate::NeuroController;

/// Scenario shared by every car of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Widths of the hidden layers of the network
    pub hidden_layers: Vec<usize>,
    pub world: WorldDef,
    pub car: CarDef,
    pub destination: Vec2,
    pub simulation: SimulationDef,
    pub world_seed: u64,
    /// Number of consecutive generations sharing one world
    pub world_seed_change_interval: usize,
    /// Largest perturbation applied to a weight by a mutation
    pub mutation_strength: f64,
    /// Output level above which a control is active
    pub control_threshold: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            hidden_layers: vec![12],
            world: WorldDef::default(),
            car: CarDef::default(),
            destination: Vec2::new(475.0, 250.0),
            simulation: SimulationDef::default(),
            world_seed: 0,
            world_seed_change_interval: 10,
            mutation_strength: 0.5,
            control_threshold: 0.5,
        }
    }
}

impl VehicleParams {
    /// Number of network inputs: one per raycast plus the car state.
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.car.raycast_angles.len() + NeuroController::STATE_INPUTS
    }

    #[must_use]
    pub fn network_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.hidden_layers.len() + 2);
        shape.push(self.input_size());
        shape.extend(&self.hidden_layers);
        shape.push(NeuroController::OUTPUTS);
        shape
    }

    /// Seed of the world driven in `generation`.
    #[must_use]
    pub fn world_seed_for(&self, generation: usize) -> u64 {
        let epoch = generation / self.world_seed_change_interval.max(1);
        self.world_seed.wrapping_add(epoch as u64)
    }

    /// Straight-line distance from the start to the destination.
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.car.position.distance(self.destination)
    }

    /// Normalized fitness of a drive, in `[0, 1]`.
    #[must_use]
    pub fn fitness(&self, outcome: &DriveOutcome) -> Fitness {
        (1.0 - outcome.distance / self.max_distance()).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_seed_change_interval == 0 {
            return Err(ConfigError::genome(
                "world seed change interval must be at least 1",
            ));
        }
        if self.hidden_layers.contains(&0) {
            return Err(ConfigError::genome("hidden layers must not be empty"));
        }
        self.world
            .validate()
            .map_err(|e| ConfigError::genome(e.to_string()))?;
        let inside = |p: Vec2| {
            (0.0..=self.world.width).contains(&p.x) && (0.0..=self.world.height).contains(&p.y)
        };
        if !inside(self.car.position) || !inside(self.destination) {
            return Err(ConfigError::genome(format!(
                "start {} and destination {} must lie inside the world",
                self.car.position, self.destination
            )));
        }
        if self.max_distance() <= 0.0 {
            return Err(ConfigError::genome("destination must differ from the start"));
        }
        if !(self.mutation_strength > 0.0 && self.mutation_strength.is_finite()) {
            return Err(ConfigError::genome(format!(
                "mutation strength {} must be positive",
                self.mutation_strength
            )));
        }
        if !(self.simulation.time_step > 0.0 && self.simulation.time_step.is_finite()) {
            return Err(ConfigError::genome("simulation time step must be positive"));
        }
        Ok(())
    }
}

/// A genome whose subject is a car driven by a neural network.
#[derive(Debug, Clone)]
pub struct SelfDrivingCar {
    network: NeuralNetwork,
    params: Arc<VehicleParams>,
    last_drive: Option<DriveOutcome>,
}

impl SelfDrivingCar {
    /// Creates a car whose network has the shape required by `params`, with all
    /// parameters set to zero.
    pub fn new(params: Arc<VehicleParams>) -> Result<Self, ShapeError> {
        let network = NeuralNetwork::new(&params.network_shape())?;
        Ok(Self::with_network(network, params))
    }

    /// Creates a car driven by an existing network.
    ///
    /// The shape is checked against `params` by [`Genome::init`].
    #[must_use]
    pub fn with_network(network: NeuralNetwork, params: Arc<VehicleParams>) -> Self {
        Self {
            network,
            params,
            last_drive: None,
        }
    }

    #[must_use]
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    #[must_use]
    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// Outcome of the drive of the last evaluation, cleared by [`Genome::reset`].
    #[must_use]
    pub fn last_drive(&self) -> Option<&DriveOutcome> {
        self.last_drive.as_ref()
    }

    /// Drives a fresh car through the world of `generation`.
    ///
    /// The world and the car only live for the duration of the call.
    pub fn drive(&self, generation: usize) -> Result<DriveOutcome, EvaluationError> {
        let params = &*self.params;
        let world = World::generate(
            &params.world,
            params.world_seed_for(generation),
            params.car.position,
            params.destination,
        )
        .map_err(|e| EvaluationError::simulation(e.to_string()))?;
        let simulation = Simulation::new(&world, params.destination, params.simulation.clone());
        let mut car = Car::new(params.car.clone());
        let mut controller = NeuroController::new(&self.network, params.control_threshold);
        simulation
            .drive(&mut car, &mut controller)
            .map_err(|e| EvaluationError::simulation(e.to_string()))
    }
}

impl Genome for SelfDrivingCar {
    type Params = Arc<VehicleParams>;

    fn init(&mut self, params: &Arc<VehicleParams>) -> Result<(), ConfigError> {
        params.validate()?;
        let expected = params.network_shape();
        if self.network.shape() != expected {
            return Err(ConfigError::genome(format!(
                "network shape {:?} does not match the expected shape {expected:?}",
                self.network.shape()
            )));
        }
        self.params = Arc::clone(params);
        self.last_drive = None;
        Ok(())
    }

    fn randomize(&mut self, seed: u64) {
        self.network.synthesize(&mut GenomeRng::seed_from_u64(seed));
    }

    fn compute_fitness(
        &mut self,
        generation: usize,
        _rng: &mut GenomeRng,
    ) -> Result<Fitness, EvaluationError> {
        let outcome = self.drive(generation)?;
        let fitness = self.params.fitness(&outcome);
        log::trace!(
            "drive {} at {} after {} steps, fitness {fitness:.4}",
            outcome.end,
            outcome.position,
            outcome.steps
        );
        self.last_drive = Some(outcome);
        Ok(fitness)
    }

    fn reset(&mut self) {
        self.last_drive = None;
    }

    fn crossover<R>(&self, partner: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::with_network(
            self.network.crossover(&partner.network, rng),
            Arc::clone(&self.params),
        )
    }

    fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.network.mutate(rate, self.params.mutation_strength, rng);
    }
}
