//! Generational population manager.
//!
//! [`PopulationManager`] owns a fixed-size population of [`Agent`]s and walks an external
//! environment through them one episode at a time:
//!
//! ```text
//! ACTIVE(i) --report_result(f)--> ACTIVE(i), agent i terminal
//! ACTIVE(i) --advance()---------> ACTIVE(i + 1)            if i + 1 < size
//! ACTIVE(i) --advance()---------> EVOLVING --> ACTIVE(0)   if i + 1 == size, generation += 1
//! ```
//!
//! # Evolution
//!
//! When the last agent of a generation is advanced past, the manager:
//!
//! 1. Sorts agents by fitness, best first. The sort is stable, so agents with equal fitness
//!    keep their order from the generation that just ran.
//! 2. Records the best fitness seen.
//! 3. Copies the top `elite_count` agents into the next generation with their networks
//!    unchanged and their results cleared.
//! 4. Fills the remaining slots with mutated clones of parents drawn uniformly from the top
//!    [`EvolutionParams::selection_pool_size`] agents.
//!
//! All randomness (initial weights, mutation, parent choice) comes from the generator given
//! at construction, so a seeded manager reproduces the same run for the same fitness
//! reports.
//!
//! # Example
//!
//! ```
//! use evonet_training::{PopulationConfig, PopulationManager};
//!
//! let config = PopulationConfig::new(4, &[2, 3, 1]);
//! let mut manager = PopulationManager::with_seed(config, 7).unwrap();
//!
//! for fitness in [10.0, 40.0, 20.0, 5.0] {
//!     let output = manager.current_agent().unwrap().evaluate(&[0.5, -0.5]).unwrap();
//!     assert_eq!(output.len(), 1);
//!     manager.report_result(fitness).unwrap();
//!     manager.advance().unwrap();
//! }
//!
//! assert_eq!(manager.generation(), 2);
//! assert_eq!(manager.active_index(), 0);
//! assert_eq!(manager.best_fitness_ever(), 40.0);
//! ```

use std::mem;

use evonet_network::Network;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::{debug, info, warn};

use crate::{
    Agent, EvolutionParams, GenerationSummary, PopulationConfig, PopulationError,
    TrainingStatus,
};

/// What [`PopulationManager::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Advance {
    /// The next agent of the same generation is now active.
    NextAgent,
    /// The generation was exhausted and a new one has been bred; agent 0 is active.
    NextGeneration,
}

/// Owns the population and drives selection, elitism and mutation.
///
/// The manager is an ordinary owned value: create one per training run and pass it to the
/// code driving the environment. Every state change goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct PopulationManager<R = Pcg32> {
    config: PopulationConfig,
    agents: Vec<Agent>,
    active_index: usize,
    generation: usize,
    best_fitness_ever: f64,
    last_summary: Option<GenerationSummary>,
    rng: R,
}

impl PopulationManager<Pcg32> {
    /// Creates a manager with default evolution parameters and a randomly seeded generator.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidConfiguration`] if `population_size` is zero or
    /// `topology` is not a valid network topology.
    pub fn new(population_size: usize, topology: &[usize]) -> Result<Self, PopulationError> {
        let rng = Pcg32::from_rng(&mut rand::rng());
        Self::with_config(PopulationConfig::new(population_size, topology), rng)
    }

    /// Creates a manager whose whole run is determined by `seed`.
    pub fn with_seed(config: PopulationConfig, seed: u64) -> Result<Self, PopulationError> {
        Self::with_config(config, Pcg32::seed_from_u64(seed))
    }
}

fn random_agents<R>(config: &PopulationConfig, rng: &mut R) -> Result<Vec<Agent>, PopulationError>
where
    R: Rng + ?Sized,
{
    (0..config.population_size)
        .map(|_| {
            Network::random(&config.topology, rng)
                .map(Agent::new)
                .map_err(PopulationError::from)
        })
        .collect()
}

impl<R> PopulationManager<R>
where
    R: Rng,
{
    /// Creates a manager from a full configuration and an explicit generator.
    pub fn with_config(config: PopulationConfig, mut rng: R) -> Result<Self, PopulationError> {
        config.validate()?;
        let agents = random_agents(&config, &mut rng)?;
        info!(
            population_size = config.population_size,
            topology = ?config.topology,
            "population initialized"
        );
        Ok(Self {
            config,
            agents,
            active_index: 0,
            generation: 1,
            best_fitness_ever: 0.0,
            last_summary: None,
            rng,
        })
    }

    /// Discards the population and starts over from generation 1 with fresh random networks.
    ///
    /// The generator is not reseeded; it continues from its current state.
    pub fn reset(&mut self) -> Result<(), PopulationError> {
        self.agents = random_agents(&self.config, &mut self.rng)?;
        self.active_index = 0;
        self.generation = 1;
        self.best_fitness_ever = 0.0;
        self.last_summary = None;
        info!("population reset");
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    #[must_use]
    pub fn evolution_params(&self) -> &EvolutionParams {
        &self.config.evolution
    }

    /// Replaces the parameters used by subsequent evolution steps.
    pub fn set_evolution_params(&mut self, params: EvolutionParams) -> Result<(), PopulationError> {
        params.validate()?;
        self.config.evolution = params;
        Ok(())
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.agents.len()
    }

    /// Current generation, starting at 1.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Index of the agent being driven.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    #[must_use]
    pub fn best_fitness_ever(&self) -> f64 {
        self.best_fitness_ever
    }

    /// Fitness statistics of the most recently completed generation.
    #[must_use]
    pub fn last_summary(&self) -> Option<&GenerationSummary> {
        self.last_summary.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> TrainingStatus {
        TrainingStatus {
            generation: self.generation,
            agent: self.active_index + 1,
            best_fitness_ever: self.best_fitness_ever,
        }
    }

    #[must_use]
    pub fn is_generation_finished(&self) -> bool {
        self.active_index >= self.agents.len()
    }

    fn no_active_agent(&self) -> PopulationError {
        PopulationError::NoActiveAgent {
            active_index: self.active_index,
            population_size: self.agents.len(),
        }
    }

    /// Returns the agent the environment should be driving.
    pub fn current_agent(&self) -> Result<&Agent, PopulationError> {
        self.agents
            .get(self.active_index)
            .ok_or_else(|| self.no_active_agent())
    }

    pub fn current_agent_mut(&mut self) -> Result<&mut Agent, PopulationError> {
        let err = self.no_active_agent();
        self.agents.get_mut(self.active_index).ok_or(err)
    }

    /// Records the terminal fitness of the active agent's episode.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError::InvalidFitness`] for a NaN fitness and
    /// [`PopulationError::NoActiveAgent`] if no agent is active.
    pub fn report_result(&mut self, fitness: f64) -> Result<(), PopulationError> {
        if fitness.is_nan() {
            return Err(PopulationError::InvalidFitness);
        }
        let index = self.active_index;
        self.current_agent_mut()?.finish(fitness);
        self.best_fitness_ever = self.best_fitness_ever.max(fitness);
        debug!(
            generation = self.generation,
            agent = index + 1,
            fitness,
            "agent finished episode"
        );
        Ok(())
    }

    /// Moves to the next agent, breeding a new generation when the current one is exhausted.
    pub fn advance(&mut self) -> Result<Advance, PopulationError> {
        let agent = self.current_agent()?;
        if !agent.is_terminal() {
            warn!(
                agent = self.active_index + 1,
                "advancing past an agent that did not report a result"
            );
        }
        self.active_index += 1;
        if self.is_generation_finished() {
            self.evolve();
            return Ok(Advance::NextGeneration);
        }
        Ok(Advance::NextAgent)
    }

    /// Breeds the next generation from the current fitness values and activates agent 0.
    ///
    /// Normally triggered by [`Self::advance`]; calling it directly ends the generation early,
    /// treating agents without a result as having fitness 0.
    pub fn evolve(&mut self) {
        let size = self.agents.len();
        let params = &self.config.evolution;
        let elite_count = params.elite_count_for(size);
        let pool_size = params.selection_pool_size(size);

        let mut ranked = mem::take(&mut self.agents);
        ranked.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let summary = GenerationSummary::new(self.generation, ranked.iter().map(Agent::fitness));
        if let Some(best) = ranked.first() {
            self.best_fitness_ever = self.best_fitness_ever.max(best.fitness());
        }
        if let Some(summary) = &summary {
            info!(
                generation = summary.generation,
                max = summary.max,
                mean = summary.mean,
                best_ever = self.best_fitness_ever,
                "generation finished, evolving"
            );
        }
        debug!(elite_count, pool_size, "selecting next generation");

        let mut next = Vec::with_capacity(size);
        next.extend(ranked.iter().take(elite_count).cloned().map(|mut elite| {
            elite.reset();
            elite
        }));
        while next.len() < size {
            let parent = self.rng.random_range(0..pool_size);
            let mut child = ranked[parent].clone();
            child.network_mut().mutate(
                params.mutation_rate,
                params.mutation_strength,
                params.mutation_clamp,
                &mut self.rng,
            );
            child.reset();
            next.push(child);
        }

        self.agents = next;
        self.active_index = 0;
        self.generation += 1;
        self.last_summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(size: usize, topology: &[usize], elite_count: usize) -> PopulationConfig {
        let mut config = PopulationConfig::new(size, topology);
        config.evolution.elite_count = elite_count;
        config
    }

    /// Runs one full generation, reporting `fitnesses` in agent order.
    fn run_generation<R: Rng>(manager: &mut PopulationManager<R>, fitnesses: &[f64]) -> Advance {
        let mut last = Advance::NextAgent;
        for &fitness in fitnesses {
            let input = vec![0.5; manager.config().topology[0]];
            manager.current_agent().unwrap().evaluate(&input).unwrap();
            manager.report_result(fitness).unwrap();
            last = manager.advance().unwrap();
        }
        last
    }

    #[test]
    fn test_invalid_configuration() {
        for (size, topology) in [(0, &[2, 1][..]), (4, &[2][..]), (4, &[][..])] {
            let err = PopulationManager::new(size, topology).unwrap_err();
            assert!(matches!(err, PopulationError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn test_initial_state() {
        let manager = PopulationManager::new(6, &[3, 2]).unwrap();
        assert_eq!(manager.population_size(), 6);
        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(manager.best_fitness_ever(), 0.0);
        assert!(manager.last_summary().is_none());
        assert!(!manager.is_generation_finished());
        assert!(
            manager
                .agents()
                .iter()
                .all(|a| a.fitness() == 0.0 && !a.is_terminal())
        );
    }

    #[test]
    fn test_report_and_advance_within_generation() {
        let mut manager = PopulationManager::with_seed(config(3, &[2, 1], 1), 1).unwrap();
        manager.report_result(12.0).unwrap();
        assert!(manager.current_agent().unwrap().is_terminal());
        assert_eq!(manager.current_agent().unwrap().fitness(), 12.0);
        assert_eq!(manager.advance().unwrap(), Advance::NextAgent);
        assert_eq!(manager.active_index(), 1);
        assert_eq!(manager.best_fitness_ever(), 12.0);
        assert_eq!(manager.status().to_string(), "Gen: 1 | Agent: 2 | Best: 12");
    }

    #[test]
    fn test_end_to_end_best_agent_becomes_first() {
        let mut manager = PopulationManager::with_seed(config(4, &[2, 3, 1], 1), 42).unwrap();
        let champion = manager.agents()[1].network().clone();

        let last = run_generation(&mut manager, &[10.0, 40.0, 20.0, 5.0]);

        assert!(last.is_next_generation());
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(manager.best_fitness_ever(), 40.0);
        let first = &manager.agents()[0];
        assert_eq!(first.network(), &champion);
        assert_eq!(first.fitness(), 0.0);
        assert!(!first.is_terminal());
    }

    #[test]
    fn test_evolve_invariants() {
        let mut manager = PopulationManager::with_seed(config(10, &[3, 4, 2], 5), 5).unwrap();
        let fitnesses: Vec<f64> = (0..10).map(f64::from).collect();
        run_generation(&mut manager, &fitnesses);

        assert_eq!(manager.population_size(), 10);
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.active_index(), 0);
        assert!(
            manager
                .agents()
                .iter()
                .all(|a| a.fitness() == 0.0 && !a.is_terminal())
        );
        let summary = manager.last_summary().unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.min, 0.0);
    }

    #[test]
    fn test_elites_keep_rank_order_and_weights() {
        let mut manager = PopulationManager::with_seed(config(6, &[2, 2], 3), 11).unwrap();
        let before: Vec<Network> = manager.agents().iter().map(|a| a.network().clone()).collect();
        run_generation(&mut manager, &[1.0, 6.0, 3.0, 5.0, 2.0, 4.0]);

        let elites: Vec<&Network> = manager.agents()[..3].iter().map(Agent::network).collect();
        assert_eq!(elites, vec![&before[1], &before[3], &before[5]]);
    }

    #[test]
    fn test_ties_keep_previous_order() {
        let mut manager = PopulationManager::with_seed(config(4, &[2, 1], 4), 3).unwrap();
        let before: Vec<Network> = manager.agents().iter().map(|a| a.network().clone()).collect();
        run_generation(&mut manager, &[7.0; 4]);

        let after: Vec<Network> = manager.agents().iter().map(|a| a.network().clone()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_elite_count_clamped_to_population() {
        let mut manager = PopulationManager::with_seed(config(3, &[2, 1], 5), 8).unwrap();
        run_generation(&mut manager, &[1.0, 2.0, 3.0]);
        assert_eq!(manager.population_size(), 3);
        assert_eq!(manager.generation(), 2);
    }

    #[test]
    fn test_children_come_from_selection_pool() {
        let mut config = config(5, &[2, 3, 1], 1);
        // pool of one and no mutation: every child is a copy of the winner
        config.evolution.selection_pool_fraction = 0.2;
        config.evolution.mutation_rate = 0.0;
        let mut manager = PopulationManager::with_seed(config, 13).unwrap();
        let winner = manager.agents()[2].network().clone();
        run_generation(&mut manager, &[1.0, 2.0, 9.0, 3.0, 4.0]);

        assert!(manager.agents().iter().all(|a| a.network() == &winner));
    }

    #[test]
    fn test_children_are_mutated() {
        let mut config = config(5, &[2, 3, 1], 1);
        config.evolution.selection_pool_fraction = 0.2;
        config.evolution.mutation_rate = 1.0;
        let mut manager = PopulationManager::with_seed(config, 13).unwrap();
        let winner = manager.agents()[0].network().clone();
        run_generation(&mut manager, &[9.0, 2.0, 1.0, 3.0, 4.0]);

        assert_eq!(manager.agents()[0].network(), &winner);
        assert!(manager.agents()[1..].iter().all(|a| a.network() != &winner));
    }

    #[test]
    fn test_best_fitness_is_non_decreasing() {
        let mut manager = PopulationManager::with_seed(config(4, &[2, 1], 1), 21).unwrap();
        let reports = [3.0, 8.0, 1.0, 0.0, 2.0, 5.0, 9.0, 4.0, 0.5, 0.5, 0.5, 0.5];
        let mut previous = manager.best_fitness_ever();
        for fitness in reports {
            manager.report_result(fitness).unwrap();
            manager.advance().unwrap();
            assert!(manager.best_fitness_ever() >= previous);
            previous = manager.best_fitness_ever();
        }
        assert_eq!(previous, 9.0);
        assert_eq!(manager.generation(), 4);
    }

    #[test]
    fn test_nan_fitness_rejected() {
        let mut manager = PopulationManager::with_seed(config(2, &[2, 1], 1), 2).unwrap();
        assert_eq!(
            manager.report_result(f64::NAN),
            Err(PopulationError::InvalidFitness)
        );
        assert!(!manager.current_agent().unwrap().is_terminal());
    }

    #[test]
    fn test_no_active_agent_when_exhausted() {
        let mut manager = PopulationManager::with_seed(config(2, &[2, 1], 1), 2).unwrap();
        manager.active_index = manager.population_size();
        assert!(manager.is_generation_finished());
        assert!(matches!(
            manager.current_agent(),
            Err(PopulationError::NoActiveAgent {
                active_index: 2,
                population_size: 2
            })
        ));
        assert!(manager.report_result(1.0).is_err());
        assert!(manager.advance().is_err());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut manager = PopulationManager::with_seed(config(6, &[3, 4, 1], 2), 99).unwrap();
            for generation in 0..3 {
                let fitnesses: Vec<f64> = (0..6).map(|i| f64::from((i * 7 + generation) % 5)).collect();
                run_generation(&mut manager, &fitnesses);
            }
            manager
                .agents()
                .iter()
                .map(|a| a.network().clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_set_evolution_params() {
        let mut manager = PopulationManager::with_seed(config(4, &[2, 1], 1), 0).unwrap();
        let bad = EvolutionParams {
            mutation_rate: 2.0,
            ..EvolutionParams::default()
        };
        assert!(manager.set_evolution_params(bad).is_err());

        let good = EvolutionParams {
            mutation_strength: 0.05,
            ..EvolutionParams::default()
        };
        manager.set_evolution_params(good.clone()).unwrap();
        assert_eq!(manager.evolution_params(), &good);
    }

    #[test]
    fn test_reset() {
        let mut manager = PopulationManager::with_seed(config(3, &[2, 1], 1), 6).unwrap();
        run_generation(&mut manager, &[4.0, 5.0, 6.0]);
        manager.report_result(2.0).unwrap();
        manager.reset().unwrap();

        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(manager.best_fitness_ever(), 0.0);
        assert!(manager.last_summary().is_none());
        assert_eq!(manager.population_size(), 3);
    }

    #[test]
    fn test_explicit_evolve_mid_generation() {
        let mut manager = PopulationManager::with_seed(config(4, &[2, 1], 2), 17).unwrap();
        manager.report_result(3.0).unwrap();
        manager.advance().unwrap();
        manager.evolve();
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.active_index(), 0);
        assert_eq!(manager.best_fitness_ever(), 3.0);
    }
}
