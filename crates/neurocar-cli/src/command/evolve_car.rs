use std::{path::PathBuf, sync::Arc};

use neurocar_evolution::{Evolution, HookError, Population};
use neurocar_genomes::{SelfDrivingCar, VehicleParams};
use neurocar_stats::history::{CumulativeBest, FitnessHistory, WindowedBest};

use crate::{
    schema::car_model::CarModel,
    util::{self, Output},
};

use super::EvolutionArg;

const MODEL_NAME: &str = "self-driving-car";

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveCarArg {
    #[command(flatten)]
    pub(crate) evolution: EvolutionArg,
    /// Scenario JSON file (world, car and network layout)
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// World seed (overrides the scenario)
    #[arg(short = 's', long)]
    world_seed: Option<u64>,
    /// Number of generations sharing one world (overrides the scenario)
    #[arg(short = 'c', long)]
    world_change_interval: Option<usize>,
    /// File the best model is saved to after every generation
    #[arg(short = 'f', long, default_value = "last_best_model.json")]
    output: PathBuf,
    /// CSV file receiving `best, mean` per generation
    #[arg(long, default_value = "stats.csv")]
    stats: PathBuf,
    /// Number of generations averaged in the stats mean (0 averages all generations)
    #[arg(long, default_value_t = 10)]
    stats_window: usize,
}

impl EvolveCarArg {
    fn scenario(&self) -> anyhow::Result<VehicleParams> {
        let mut scenario = match &self.scenario {
            Some(path) => util::read_scenario_file(path)?,
            None => VehicleParams::default(),
        };
        if let Some(seed) = self.world_seed {
            scenario.world_seed = seed;
        }
        if let Some(interval) = self.world_change_interval {
            scenario.world_seed_change_interval = interval;
        }
        Ok(scenario)
    }
}

pub(crate) fn run(arg: &EvolveCarArg) -> anyhow::Result<()> {
    let scenario = Arc::new(arg.scenario()?);
    let params = arg.evolution.to_params();

    arg.evolution.print_header("NeuroCar Evolution", &params);
    eprintln!("  World seed:            {}", scenario.world_seed);
    eprintln!(
        "  World change interval: {}",
        scenario.world_seed_change_interval
    );
    eprintln!("  Network shape:         {:?}", scenario.network_shape());
    eprintln!("  Starting point:        {}", scenario.car.position);
    eprintln!("  Destination:           {}", scenario.destination);
    eprintln!("  Output filename:       {}", arg.output.display());
    eprintln!("  Stats filename:        {}", arg.stats.display());
    eprintln!();

    let template = SelfDrivingCar::new(Arc::clone(&scenario))?;
    let population = Population::random(&template, arg.evolution.individuals, params.seed)?;

    let mut stats = Output::create(&arg.stats)?;
    let mut history: Box<dyn FitnessHistory> = match arg.stats_window {
        0 => Box::new(CumulativeBest::new()),
        n => Box::new(WindowedBest::new(n)),
    };

    let mut engine = Evolution::new(params, scenario)
        .with_pre_generation_hook(|generation, _: &Population<SelfDrivingCar>| {
            log::info!("Generation {generation}");
            Ok(())
        })
        .with_post_generation_hook(|generation, population: &Population<SelfDrivingCar>| {
            let best = population.best();
            let record = history.record(generation, best.fitness());
            stats
                .write_line(&format!("{}, {}", record.best, record.mean))
                .map_err(HookError::new)?;

            let fitness_stats = population.compute_fitness_stats();
            log::info!(
                "Best fitness: {:.4} (mean {:.4}, worst {:.4})",
                fitness_stats.max,
                fitness_stats.mean,
                fitness_stats.min
            );
            if let Some(drive) = best.genome().last_drive() {
                log::info!(
                    "Best drive: {} at {} after {} steps",
                    drive.end,
                    drive.position,
                    drive.steps
                );
            }

            let model = CarModel::from_individual(MODEL_NAME, generation, best);
            log::info!("Saving to \"{}\"", arg.output.display());
            Output::save_json(&model, &arg.output).map_err(HookError::new)
        });
    let population = engine.evolve(population, arg.evolution.generations)?;
    drop(engine);

    let best = population.best();
    eprintln!();
    eprintln!("Model saved successfully");
    eprintln!("  Path: {}", arg.output.display());
    eprintln!("  Name: {MODEL_NAME}");
    eprintln!("  Final fitness: {:.3}", best.fitness());
    if let Some(drive) = best.genome().last_drive() {
        eprintln!("  Final drive: {} at {}", drive.end, drive.position);
    }

    Ok(())
}
