use std::path::PathBuf;

use chrono::Utc;
use evonet_network::Network;
use evonet_training::{EvolutionParams, PopulationConfig, PopulationManager};
use rand::Rng as _;
use tracing::info;

use crate::{
    env::{self, EnvKind},
    model::NetworkModel,
    util,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

impl EvolutionPhase {
    fn from_generation(generation: usize) -> Self {
        match generation {
            0..30 => Self::Exploration,
            30..80 => Self::Transition,
            _ => Self::Convergence,
        }
    }

    /// Scale applied to the configured mutation strength.
    const fn strength_scale(self) -> f64 {
        match self {
            Self::Exploration => 1.0,
            Self::Transition => 0.5,
            Self::Convergence => 0.2,
        }
    }
}

fn params_for_phase(base: &EvolutionParams, phase: EvolutionPhase) -> EvolutionParams {
    EvolutionParams {
        mutation_strength: base.mutation_strength * phase.strength_scale(),
        ..base.clone()
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Environment to train in
    #[arg(long, default_value = "runner")]
    env: EnvKind,
    /// Number of generations to evolve
    #[arg(long, default_value_t = 100)]
    generations: usize,
    /// Seed for the whole run (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Population configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of agents per generation (overrides the configuration file)
    #[arg(long)]
    population: Option<usize>,
    /// Output file path for the trained model
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        env: env_kind,
        generations,
        seed,
        config,
        population,
        output,
    } = arg;

    let mut config = match config {
        Some(path) => util::read_json_file::<PopulationConfig, _>("population config", path)?,
        None => PopulationConfig {
            topology: env_kind.default_topology(),
            ..PopulationConfig::default()
        },
    };
    if let Some(size) = population {
        config.population_size = *size;
    }
    let seed = seed.unwrap_or_else(|| rand::rng().random());

    let mut environment = env_kind.build(seed);
    config.validate()?;
    env::check_topology(environment.as_ref(), &config.topology)?;

    let base_params = config.evolution.clone();
    let mut manager = PopulationManager::with_seed(config, seed)?;
    info!(env = %env_kind, seed, generations, "training started");

    let mut champion: Option<(f64, Network)> = None;
    for generation in 0..*generations {
        let phase = EvolutionPhase::from_generation(generation);
        manager.set_evolution_params(params_for_phase(&base_params, phase))?;

        loop {
            let agent = manager.current_agent()?;
            let fitness = env::run_episode(environment.as_mut(), agent)?;
            if champion.as_ref().is_none_or(|(best, _)| fitness > *best) {
                champion = Some((fitness, agent.network().clone()));
            }
            manager.report_result(fitness)?;
            if manager.advance()?.is_next_generation() {
                break;
            }
        }

        if let Some(summary) = manager.last_summary() {
            eprintln!("{summary} ({phase:?})");
        }
    }

    let Some((best_fitness, network)) = champion else {
        eprintln!("No generations were run; nothing to save.");
        return Ok(());
    };

    eprintln!("{env_kind} training completed.");
    eprintln!("  {}", manager.status());

    let model = NetworkModel {
        env: *env_kind,
        trained_at: Utc::now(),
        seed,
        generations: *generations,
        best_fitness,
        config: manager.config().clone(),
        network,
    };
    util::save_json(&model, output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Environment: {}", model.env);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Best fitness: {:.3}", model.best_fitness);
    eprintln!("  Topology: {:?}", model.network.topology());

    Ok(())
}
