use serde::{Deserialize, Serialize};

use crate::{Car, Controls, Vec2, World};

/// Decides the controls of a car at every simulation step.
pub trait Controller {
    type Error;

    fn controls(&mut self, car: &Car, simulation: &Simulation<'_>) -> Result<Controls, Self::Error>;
}

/// Timing parameters of a drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationDef {
    /// Simulated seconds per step
    pub time_step: f64,
    pub max_steps: usize,
    /// The destination counts as reached within this distance
    pub arrival_radius: f64,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 30.0,
            max_steps: 1800,
            arrival_radius: 5.0,
        }
    }
}

/// How a drive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum DriveEnd {
    #[display("reached")]
    Reached,
    #[display("crashed")]
    Crashed,
    #[display("timed out")]
    TimedOut,
}

/// Result of [`Simulation::drive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveOutcome {
    pub end: DriveEnd,
    pub position: Vec2,
    /// Remaining distance to the destination
    pub distance: f64,
    pub steps: usize,
}

/// A drive toward a destination through a borrowed world.
#[derive(Debug, Clone)]
pub struct Simulation<'w> {
    world: &'w World,
    destination: Vec2,
    def: SimulationDef,
}

impl<'w> Simulation<'w> {
    #[must_use]
    pub fn new(world: &'w World, destination: Vec2, def: SimulationDef) -> Self {
        Self {
            world,
            destination,
            def,
        }
    }

    #[must_use]
    pub fn world(&self) -> &'w World {
        self.world
    }

    #[must_use]
    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    #[must_use]
    pub fn def(&self) -> &SimulationDef {
        &self.def
    }

    /// Drives `car` from its current state until it reaches the destination, crashes or
    /// `max_steps` steps have been simulated.
    ///
    /// Controller errors abort the drive.
    pub fn drive<C>(&self, car: &mut Car, controller: &mut C) -> Result<DriveOutcome, C::Error>
    where
        C: Controller + ?Sized,
    {
        let mut steps = 0;
        let end = loop {
            if car.position().distance(self.destination) <= self.def.arrival_radius {
                break DriveEnd::Reached;
            }
            if car.is_crashed() {
                break DriveEnd::Crashed;
            }
            if steps == self.def.max_steps {
                break DriveEnd::TimedOut;
            }
            let controls = controller.controls(car, self)?;
            car.step(controls, self.def.time_step, self.world);
            steps += 1;
        };
        Ok(DriveOutcome {
            end,
            position: car.position(),
            distance: car.position().distance(self.destination),
            steps,
        })
    }
}
