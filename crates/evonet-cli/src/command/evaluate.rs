use std::path::PathBuf;

use evonet_training::Agent;

use crate::{
    env::{self, EnvKind},
    model::NetworkModel,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the model file (JSON format)
    #[arg(long)]
    model: PathBuf,
    /// Environment to replay in (defaults to the one the model was trained in)
    #[arg(long)]
    env: Option<EnvKind>,
    /// Seed for the environment (defaults to the seed the model was trained with)
    #[arg(long)]
    seed: Option<u64>,
    /// Print the network outputs for these comma-separated inputs instead of playing an episode
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    input: Option<Vec<f64>>,
}

impl EvaluateArg {
    fn episode_setup(&self, model: &NetworkModel) -> (EnvKind, u64) {
        (
            self.env.unwrap_or(model.env),
            self.seed.unwrap_or(model.seed),
        )
    }
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let model = NetworkModel::open(&arg.model)?;
    let (env_kind, seed) = arg.episode_setup(&model);
    let agent = Agent::new(model.network);

    if let Some(input) = &arg.input {
        let outputs = agent.evaluate(input)?;
        println!("{outputs:?}");
        return Ok(());
    }

    let mut environment = env_kind.build(seed);
    env::check_topology(environment.as_ref(), agent.network().topology())?;
    let fitness = env::run_episode(environment.as_mut(), &agent)?;

    eprintln!("Environment: {env_kind} (seed {seed})");
    eprintln!("Trained fitness: {:.3} in {}", model.best_fitness, model.env);
    println!("{fitness:.3}");

    Ok(())
}
