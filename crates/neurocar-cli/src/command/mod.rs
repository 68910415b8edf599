use clap::{Parser, Subcommand};
use neurocar_evolution::{EvolutionParams, SelectionMethod};

use self::{evolve_car::EvolveCarArg, evolve_string::EvolveStringArg, replay_car::ReplayCarArg};

mod evolve_car;
mod evolve_string;
mod replay_car;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve a random string toward a target phrase
    EvolveString(#[clap(flatten)] EvolveStringArg),
    /// Evolve neural networks driving a car to a destination
    EvolveCar(#[clap(flatten)] EvolveCarArg),
    /// Drive a saved car model once and report its fitness
    ReplayCar(#[clap(flatten)] ReplayCarArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::EvolveString(arg) => evolve_string::run(&arg)?,
        Mode::EvolveCar(arg) => evolve_car::run(&arg)?,
        Mode::ReplayCar(arg) => replay_car::run(&arg)?,
    }
    Ok(())
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum Selection {
    #[default]
    Roulette,
    Tournament,
}

/// Options shared by the evolution commands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvolutionArg {
    /// Number of individuals per generation
    #[arg(short = 'i', long, default_value_t = 100)]
    individuals: usize,
    /// Number of generations to train
    #[arg(short = 'g', long, default_value_t = 100)]
    generations: usize,
    /// Probability of mutating each gene of an offspring
    #[arg(short = 'm', long, default_value_t = 0.01)]
    mutation_rate: f64,
    /// Number of best individuals copied unchanged into the next generation
    #[arg(short = 'e', long, default_value_t = 2)]
    elitism: usize,
    /// Parent selection method (roulette or tournament)
    #[arg(long, default_value = "roulette")]
    selection: Selection,
    /// Number of contestants per tournament
    #[arg(long, default_value_t = 3)]
    tournament_size: usize,
    /// Master random seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of worker threads (all available cores if omitted)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

impl EvolutionArg {
    fn to_params(&self) -> EvolutionParams {
        let defaults = EvolutionParams::default();
        let selection = match self.selection {
            Selection::Roulette => SelectionMethod::Roulette,
            Selection::Tournament => SelectionMethod::Tournament {
                size: self.tournament_size,
            },
        };
        EvolutionParams {
            mutation_rate: self.mutation_rate,
            elite_count: self.elitism,
            selection,
            seed: self.seed.unwrap_or_else(rand::random),
            threads: self.threads.unwrap_or(defaults.threads),
        }
    }

    fn print_header(&self, title: &str, params: &EvolutionParams) {
        eprintln!("### {title} ###");
        eprintln!("  Number of individuals: {}", self.individuals);
        eprintln!("  Number of generations: {}", self.generations);
        eprintln!("  Mutation rate:         {}", params.mutation_rate);
        eprintln!("  Elitism:               {}", params.elite_count);
        eprintln!("  Selection:             {:?}", params.selection);
        eprintln!("  Seed:                  {}", params.seed);
        eprintln!("  Threads:               {}", params.threads);
    }
}
