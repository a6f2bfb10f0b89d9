//! Evolutionary training engine for feedforward control policies.
//!
//! This crate evolves a population of [`evonet_network::Network`]s against episodic
//! feedback from an external environment. The environment never sees the genetic
//! algorithm; it only follows a small protocol:
//!
//! 1. **Observe** - build an input vector for the current tick
//! 2. **Act** - [`PopulationManager::current_agent`] then [`Agent::evaluate`]
//! 3. **Report** - at episode end, [`PopulationManager::report_result`] with a scalar fitness
//! 4. **Advance** - [`PopulationManager::advance`] moves to the next agent, and after the last
//!    agent of a generation breeds the next generation before returning
//!
//! # Architecture
//!
//! ```text
//! Environment (host simulation)
//!     ↓ input vector per tick
//! PopulationManager ── current agent ──→ Agent ──→ Network::evaluate
//!     ↑ fitness per episode                            ↓ output vector
//!     └──────────────── report_result / advance ←── Environment
//! ```
//!
//! Learning is driven only by the terminal fitness of each episode: there is no gradient,
//! no crossover, and no reward shaping inside the engine. Selection is truncation-based
//! (parents are drawn uniformly from the top of the ranking), elites survive unchanged,
//! and offspring differ from their parent by Gaussian weight mutation.
//!
//! # Configuration
//!
//! Every tunable is a named field of [`PopulationConfig`] / [`EvolutionParams`] with a
//! documented default (see [`params`]). Evolution parameters can be changed between
//! generations, e.g. to anneal mutation strength.
//!
//! # Determinism
//!
//! The manager owns its random generator. [`PopulationManager::with_seed`] (or
//! [`PopulationManager::with_config`] with any seeded [`rand::Rng`]) reproduces a run exactly,
//! given the same fitness reports.
//!
//! # Current Limitations
//!
//! - **Sequential only**: one agent is driven at a time; there is no parallel evaluation
//! - **Fixed topology**: networks never grow or prune layers
//! - **Single objective**: fitness is a single scalar per episode

pub use self::{
    agent::Agent,
    params::{ConfigError, EvolutionParams, PopulationConfig},
    population::{Advance, PopulationManager},
    summary::{GenerationSummary, TrainingStatus},
};

use evonet_network::NetworkError;

mod agent;
pub mod params;
mod population;
mod summary;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PopulationError {
    #[display("invalid configuration: {_0}")]
    #[from]
    InvalidConfiguration(ConfigError),
    #[display("no active agent: index {active_index} is past the population of {population_size}")]
    NoActiveAgent {
        active_index: usize,
        population_size: usize,
    },
    #[display("fitness must not be NaN")]
    InvalidFitness,
    #[display("{_0}")]
    #[from]
    Network(NetworkError),
}
