use neurocar_evolution::{Evolution, HookError, Population};
use neurocar_genomes::EvolvingString;

use super::EvolutionArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolveStringArg {
    /// Phrase to evolve toward
    #[arg(long, default_value = "To be or not to be")]
    pub(crate) target: String,
    #[command(flatten)]
    pub(crate) evolution: EvolutionArg,
}

pub(crate) fn run(arg: &EvolveStringArg) -> anyhow::Result<()> {
    let EvolveStringArg { target, evolution } = arg;
    let params = evolution.to_params();
    evolution.print_header("NeuroCar String Evolution", &params);
    eprintln!("  Target:                {target:?}");
    eprintln!();

    let template = EvolvingString::new(target.as_str());
    let population = Population::random(&template, evolution.individuals, params.seed)?;

    let mut engine = Evolution::new(params, ()).with_post_generation_hook(
        |generation, population: &Population<EvolvingString>| {
            let best = population.best();
            log::info!(
                "Generation #{generation}: {:?} ({:.3})",
                best.genome().genes(),
                best.fitness()
            );
            Ok::<_, HookError>(())
        },
    );
    let population = engine.evolve(population, evolution.generations)?;

    eprintln!("Best Individuals:");
    for (rank, i) in population.ranking().into_iter().take(5).enumerate() {
        let ind = &population.individuals()[i];
        eprintln!("  {rank:2}: {:?} => {:.3}", ind.genome().genes(), ind.fitness());
    }

    Ok(())
}
