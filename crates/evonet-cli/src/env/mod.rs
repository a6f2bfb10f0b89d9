//! Built-in environments for driving a population from the command line.
//!
//! An environment plays one episode at a time: it is [`Environment::reset`], then observed
//! and stepped with the network's outputs until [`Environment::step`] returns the episode's
//! fitness.

use anyhow::ensure;
use evonet_training::Agent;
use serde::{Deserialize, Serialize};

pub(crate) use self::{runner::Runner, xor::Xor};

mod runner;
mod xor;

pub(crate) trait Environment {
    /// Length of the vector returned by [`Self::observe`].
    fn input_size(&self) -> usize;

    /// Number of network outputs [`Self::step`] reads.
    fn output_size(&self) -> usize;

    /// Starts a new episode.
    fn reset(&mut self);

    fn observe(&self) -> Vec<f64>;

    /// Advances one tick using the network's outputs.
    ///
    /// Returns the episode's fitness once it has ended.
    fn step(&mut self, outputs: &[f64]) -> Option<f64>;
}

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum EnvKind {
    #[default]
    #[display("runner")]
    Runner,
    #[display("xor")]
    Xor,
}

impl EnvKind {
    /// Topology used when no configuration file provides one.
    pub(crate) fn default_topology(self) -> Vec<usize> {
        match self {
            EnvKind::Runner => vec![Runner::INPUT_SIZE, 8, 8, 1],
            EnvKind::Xor => vec![2, 4, 1],
        }
    }

    pub(crate) fn build(self, seed: u64) -> Box<dyn Environment> {
        match self {
            EnvKind::Runner => Box::new(Runner::new(seed)),
            EnvKind::Xor => Box::new(Xor::new()),
        }
    }
}

/// Fails unless a network with `topology` fits `env`.
pub(crate) fn check_topology(env: &dyn Environment, topology: &[usize]) -> anyhow::Result<()> {
    let (first, last) = (topology[0], topology[topology.len() - 1]);
    ensure!(
        first == env.input_size(),
        "network takes {first} inputs, environment provides {}",
        env.input_size()
    );
    ensure!(
        last >= env.output_size(),
        "network produces {last} outputs, environment needs {}",
        env.output_size()
    );
    Ok(())
}

/// Plays one full episode with `agent` and returns its fitness.
pub(crate) fn run_episode(env: &mut dyn Environment, agent: &Agent) -> anyhow::Result<f64> {
    env.reset();
    loop {
        let outputs = agent.evaluate(&env.observe())?;
        if let Some(fitness) = env.step(&outputs) {
            return Ok(fitness);
        }
    }
}

#[cfg(test)]
mod tests {
    use evonet_network::Network;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_env_kind_from_str() {
        assert_eq!("runner".parse::<EnvKind>().unwrap(), EnvKind::Runner);
        assert_eq!("Xor".parse::<EnvKind>().unwrap(), EnvKind::Xor);
        assert!("maze".parse::<EnvKind>().is_err());
        assert_eq!(EnvKind::Xor.to_string(), "xor");
    }

    #[test]
    fn test_default_topologies_fit() {
        for kind in [EnvKind::Runner, EnvKind::Xor] {
            let env = kind.build(1);
            check_topology(env.as_ref(), &kind.default_topology()).unwrap();
        }
        let env = EnvKind::Xor.build(1);
        assert!(check_topology(env.as_ref(), &[3, 1]).is_err());
    }

    #[test]
    fn test_run_episode_terminates() {
        let mut rng = Pcg32::seed_from_u64(4);
        for kind in [EnvKind::Runner, EnvKind::Xor] {
            let mut env = kind.build(4);
            let agent = Agent::new(Network::random(&kind.default_topology(), &mut rng).unwrap());
            let fitness = run_episode(env.as_mut(), &agent).unwrap();
            assert!(fitness >= 0.0);
            // episodes replay identically
            assert_eq!(run_episode(env.as_mut(), &agent).unwrap(), fitness);
        }
    }
}
