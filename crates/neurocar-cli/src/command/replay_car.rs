use std::{path::PathBuf, sync::Arc};

use neurocar_evolution::{Genome as _, GenomeRng};
use neurocar_genomes::SelfDrivingCar;
use rand::SeedableRng as _;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayCarArg {
    /// Saved car model
    #[arg(short = 'f', long, default_value = "last_best_model.json")]
    model: PathBuf,
    /// World seed (overrides the one the model was trained on)
    #[arg(short = 's', long)]
    world_seed: Option<u64>,
    /// Generation whose world is driven (defaults to the generation the model was saved in)
    #[arg(long)]
    generation: Option<usize>,
}

pub(crate) fn run(arg: &ReplayCarArg) -> anyhow::Result<()> {
    let mut model = util::read_car_model_file(&arg.model)?;
    if let Some(seed) = arg.world_seed {
        model.scenario.world_seed = seed;
    }
    let generation = arg.generation.unwrap_or(model.generation);

    eprintln!("### NeuroCar Replay ###");
    eprintln!("  Model:         {}", arg.model.display());
    eprintln!("  Name:          {}", model.name);
    eprintln!("  Trained at:    {}", model.trained_at);
    eprintln!("  Saved fitness: {:.3}", model.final_fitness);
    eprintln!("  Network shape: {:?}", model.network.shape());
    eprintln!();

    let scenario = Arc::new(model.scenario);
    let mut car = SelfDrivingCar::with_network(model.network, Arc::clone(&scenario));
    car.init(&scenario)?;
    // vehicle evaluation never draws from the rng
    let fitness = car.compute_fitness(generation, &mut GenomeRng::seed_from_u64(0))?;

    if let Some(drive) = car.last_drive() {
        eprintln!(
            "Drive {} at {} after {} steps ({:.1} from the destination)",
            drive.end, drive.position, drive.steps, drive.distance
        );
    }
    println!("Fitness = {fitness}");

    Ok(())
}
