use chrono::{DateTime, Utc};
use neurocar_evolution::Individual;
use neurocar_genomes::{SelfDrivingCar, VehicleParams};
use neurocar_network::NeuralNetwork;
use serde::{Deserialize, Serialize};

/// A trained car network together with the scenario it was trained on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generation: usize,
    pub final_fitness: f64,
    pub scenario: VehicleParams,
    pub network: NeuralNetwork,
}

impl CarModel {
    pub(crate) fn from_individual(
        name: &str,
        generation: usize,
        individual: &Individual<SelfDrivingCar>,
    ) -> Self {
        let genome = individual.genome();
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            generation,
            final_fitness: individual.fitness(),
            scenario: genome.params().clone(),
            network: genome.network().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_json_round_trip() {
        let scenario = VehicleParams {
            world_seed: 42,
            ..VehicleParams::default()
        };
        let model = CarModel {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            generation: 7,
            final_fitness: 0.5,
            network: NeuralNetwork::new(&scenario.network_shape()).unwrap(),
            scenario,
        };
        let json = serde_json::to_string(&model).unwrap();
        let restored: CarModel = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.generation, 7);
        assert_eq!(restored.trained_at, model.trained_at);
        assert_eq!(restored.scenario, model.scenario);
        assert_eq!(restored.network, model.network);
    }
}
