use evonet_network::{Network, NetworkError};

/// One candidate controller: a network together with the result of its last episode.
///
/// `fitness` and `terminal` are set by
/// [`PopulationManager::report_result`](crate::PopulationManager::report_result) and cleared
/// with [`Agent::reset`] whenever the agent seeds a member of the next generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    network: Network,
    fitness: f64,
    terminal: bool,
}

impl Agent {
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            network,
            fitness: 0.0,
            terminal: false,
        }
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Fitness reported for the last episode, or `0.0` if none has been reported.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Whether the agent's episode has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Runs the agent's network on one observation.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.network.evaluate(input)
    }

    /// Clears fitness and the terminal flag, keeping the network.
    pub fn reset(&mut self) {
        self.fitness = 0.0;
        self.terminal = false;
    }

    pub(crate) fn finish(&mut self, fitness: f64) {
        self.fitness = fitness;
        self.terminal = true;
    }

    pub(crate) fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }
}
