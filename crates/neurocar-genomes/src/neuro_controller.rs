use neurocar_network::{InputSizeError, NeuralNetwork};
use neurocar_sim::{Car, Controller, Controls, Simulation, wrap_angle};

/// Drives a car with a neural network.
///
/// The network receives the car's raycast readings followed by
/// [`NeuroController::STATE_INPUTS`] values describing its state:
///
/// 1. speed relative to the car's maximum speed
/// 2. sine of the bearing to the destination, relative to the heading
/// 3. cosine of that bearing
/// 4. remaining distance relative to the world diagonal
///
/// Its four outputs are read as accelerate, brake, turn left and turn right; a control
/// is active when its output exceeds the threshold.
#[derive(Debug, Clone, Copy)]
pub struct NeuroController<'n> {
    network: &'n NeuralNetwork,
    threshold: f64,
}

impl<'n> NeuroController<'n> {
    pub const STATE_INPUTS: usize = 4;
    pub const OUTPUTS: usize = 4;

    #[must_use]
    pub fn new(network: &'n NeuralNetwork, threshold: f64) -> Self {
        Self { network, threshold }
    }

    /// Builds the network inputs for the current state of `car`.
    #[must_use]
    pub fn inputs(car: &Car, simulation: &Simulation<'_>) -> Vec<f64> {
        let world = simulation.world();
        let to_destination = simulation.destination() - car.position();
        let bearing = wrap_angle(to_destination.angle() - car.angle());
        let (sin, cos) = bearing.sin_cos();

        let mut inputs = car.sense(world);
        inputs.extend([
            car.speed() / car.def().max_speed,
            sin,
            cos,
            to_destination.length() / world.diagonal(),
        ]);
        inputs
    }
}

impl Controller for NeuroController<'_> {
    type Error = InputSizeError;

    fn controls(
        &mut self,
        car: &Car,
        simulation: &Simulation<'_>,
    ) -> Result<Controls, InputSizeError> {
        let outputs = self.network.compute(&Self::inputs(car, simulation))?;
        let active = |i: usize| outputs.get(i).is_some_and(|&o| o > self.threshold);
        Ok(Controls {
            accelerate: active(0),
            brake: active(1),
            turn_left: active(2),
            turn_right: active(3),
        })
    }
}

#[cfg(test)]
mod tests {
    use neurocar_sim::{CarDef, SimulationDef, Vec2, World};

    use super::*;

    fn network(input_size: usize, biases: [f64; 4]) -> NeuralNetwork {
        let mut network = NeuralNetwork::new(&[input_size, NeuroController::OUTPUTS]).unwrap();
        for (i, b) in biases.into_iter().enumerate() {
            network.set_bias(0, i, b);
        }
        network
    }

    #[test]
    fn test_inputs_layout() {
        let world = World::new(300.0, 400.0, vec![]).unwrap();
        let sim = Simulation::new(&world, Vec2::new(25.0, 350.0), SimulationDef::default());
        let car = Car::new(CarDef::default());

        let inputs = NeuroController::inputs(&car, &sim);
        assert_eq!(inputs.len(), 10 + NeuroController::STATE_INPUTS);
        let state = &inputs[10..];
        assert_eq!(state[0], 0.0);
        // destination straight to the left of a car heading along +x
        assert!((state[1] - 1.0).abs() < 1e-12);
        assert!(state[2].abs() < 1e-12);
        assert!((state[3] - 100.0 / 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_outputs_map_to_controls() {
        let world = World::new(500.0, 500.0, vec![]).unwrap();
        let sim = Simulation::new(&world, Vec2::new(475.0, 250.0), SimulationDef::default());
        let car = Car::new(CarDef::default());

        let net = network(14, [5.0, -5.0, 5.0, -5.0]);
        let controls = NeuroController::new(&net, 0.9).controls(&car, &sim).unwrap();
        assert_eq!(
            controls,
            Controls {
                accelerate: true,
                brake: false,
                turn_left: true,
                turn_right: false,
            }
        );
    }

    #[test]
    fn test_input_size_mismatch() {
        let world = World::new(500.0, 500.0, vec![]).unwrap();
        let sim = Simulation::new(&world, Vec2::new(475.0, 250.0), SimulationDef::default());
        let car = Car::new(CarDef::default());

        let net = network(3, [0.0; 4]);
        let error = NeuroController::new(&net, 0.5)
            .controls(&car, &sim)
            .unwrap_err();
        assert_eq!(
            error,
            InputSizeError {
                expected: 3,
                actual: 14
            }
        );
    }
}
