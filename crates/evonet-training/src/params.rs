//! Population and evolution configuration.
//!
//! [`PopulationConfig`] fixes the shape of a training run (how many agents, what network
//! topology) and carries the [`EvolutionParams`] that control how one generation turns into
//! the next. Both are plain serde-friendly structs so a run can be described in a JSON file;
//! missing fields fall back to their [`Default`] values.
//!
//! # Defaults
//!
//! | Parameter                 | Default        |
//! |---------------------------|----------------|
//! | `population_size`         | 50             |
//! | `topology`                | `[5, 8, 8, 1]` |
//! | `elite_count`             | 5              |
//! | `selection_pool_fraction` | 0.5            |
//! | `mutation_rate`           | 0.1            |
//! | `mutation_strength`       | 0.5            |
//! | `mutation_clamp`          | none           |

use serde::{Deserialize, Serialize};

pub const DEFAULT_POPULATION_SIZE: usize = 50;
pub const DEFAULT_TOPOLOGY: [usize; 4] = [5, 8, 8, 1];
pub const DEFAULT_ELITE_COUNT: usize = 5;
pub const DEFAULT_SELECTION_POOL_FRACTION: f64 = 0.5;
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;
pub const DEFAULT_MUTATION_STRENGTH: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("topology {topology:?} needs at least two layers, each with one or more units")]
    InvalidTopology { topology: Vec<usize> },
    #[display("selection pool fraction must be in (0, 1], got {value}")]
    InvalidSelectionPoolFraction { value: f64 },
    #[display("mutation rate must be in [0, 1], got {value}")]
    InvalidMutationRate { value: f64 },
    #[display("mutation strength must be finite and non-negative, got {value}")]
    InvalidMutationStrength { value: f64 },
    #[display("mutation clamp must be finite and positive, got {value}")]
    InvalidMutationClamp { value: f64 },
}

/// Parameters controlling how the next generation is produced.
///
/// These may be swapped between generations (see
/// [`PopulationManager::set_evolution_params`](crate::PopulationManager::set_evolution_params)),
/// e.g. to lower mutation strength as training converges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Number of top agents carried over unmutated. Clamped to the population size.
    pub elite_count: usize,
    /// Fraction of the sorted population parents are sampled from.
    pub selection_pool_fraction: f64,
    /// Per-scalar probability that a weight or bias is perturbed.
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian perturbation.
    pub mutation_strength: f64,
    /// If set, mutated entries are clamped to `[-clamp, clamp]`.
    pub mutation_clamp: Option<f64>,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            elite_count: DEFAULT_ELITE_COUNT,
            selection_pool_fraction: DEFAULT_SELECTION_POOL_FRACTION,
            mutation_rate: DEFAULT_MUTATION_RATE,
            mutation_strength: DEFAULT_MUTATION_STRENGTH,
            mutation_clamp: None,
        }
    }
}

impl EvolutionParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.selection_pool_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::InvalidSelectionPoolFraction { value: fraction });
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ConfigError::InvalidMutationRate {
                value: self.mutation_rate,
            });
        }
        if !(self.mutation_strength.is_finite() && self.mutation_strength >= 0.0) {
            return Err(ConfigError::InvalidMutationStrength {
                value: self.mutation_strength,
            });
        }
        if let Some(clamp) = self.mutation_clamp
            && !(clamp.is_finite() && clamp > 0.0)
        {
            return Err(ConfigError::InvalidMutationClamp { value: clamp });
        }
        Ok(())
    }

    /// Number of elites for a population of `population_size` agents.
    #[must_use]
    pub fn elite_count_for(&self, population_size: usize) -> usize {
        self.elite_count.min(population_size)
    }

    /// Number of top-ranked agents eligible as parents, always in `1..=population_size`.
    ///
    /// # Examples
    ///
    /// ```
    /// use evonet_training::EvolutionParams;
    ///
    /// let params = EvolutionParams::default();
    /// assert_eq!(params.selection_pool_size(50), 25);
    /// assert_eq!(params.selection_pool_size(3), 1);
    /// assert_eq!(params.selection_pool_size(1), 1);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn selection_pool_size(&self, population_size: usize) -> usize {
        let pool = (population_size as f64 * self.selection_pool_fraction).floor() as usize;
        pool.clamp(1, population_size.max(1))
    }
}

/// Shape of a training run plus its evolution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub population_size: usize,
    pub topology: Vec<usize>,
    #[serde(flatten)]
    pub evolution: EvolutionParams,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            topology: DEFAULT_TOPOLOGY.to_vec(),
            evolution: EvolutionParams::default(),
        }
    }
}

impl PopulationConfig {
    /// Default parameters with the given population size and topology.
    #[must_use]
    pub fn new(population_size: usize, topology: &[usize]) -> Self {
        Self {
            population_size,
            topology: topology.to_vec(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.topology.len() < 2 || self.topology.contains(&0) {
            return Err(ConfigError::InvalidTopology {
                topology: self.topology.clone(),
            });
        }
        self.evolution.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PopulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_population_and_short_topology() {
        assert_eq!(
            PopulationConfig::new(0, &[2, 1]).validate(),
            Err(ConfigError::EmptyPopulation)
        );
        assert!(matches!(
            PopulationConfig::new(4, &[2]).validate(),
            Err(ConfigError::InvalidTopology { .. })
        ));
        assert!(matches!(
            PopulationConfig::new(4, &[2, 0, 1]).validate(),
            Err(ConfigError::InvalidTopology { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_evolution_params() {
        let cases = [
            EvolutionParams {
                selection_pool_fraction: 0.0,
                ..EvolutionParams::default()
            },
            EvolutionParams {
                selection_pool_fraction: 1.5,
                ..EvolutionParams::default()
            },
            EvolutionParams {
                mutation_rate: -0.1,
                ..EvolutionParams::default()
            },
            EvolutionParams {
                mutation_strength: f64::NAN,
                ..EvolutionParams::default()
            },
            EvolutionParams {
                mutation_clamp: Some(0.0),
                ..EvolutionParams::default()
            },
        ];
        for params in cases {
            assert!(params.validate().is_err(), "{params:?}");
        }
    }

    #[test]
    fn test_pool_and_elite_sizes() {
        let params = EvolutionParams {
            elite_count: 5,
            selection_pool_fraction: 0.25,
            ..EvolutionParams::default()
        };
        assert_eq!(params.elite_count_for(3), 3);
        assert_eq!(params.elite_count_for(30), 5);
        assert_eq!(params.selection_pool_size(30), 7);
        assert_eq!(params.selection_pool_size(2), 1);

        let all = EvolutionParams {
            selection_pool_fraction: 1.0,
            ..EvolutionParams::default()
        };
        assert_eq!(all.selection_pool_size(9), 9);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{"population_size": 10, "mutation_rate": 0.2, "mutation_clamp": 3.0}"#;
        let config: PopulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.population_size, 10);
        assert_eq!(config.topology, DEFAULT_TOPOLOGY);
        assert_eq!(config.evolution.mutation_rate, 0.2);
        assert_eq!(config.evolution.mutation_clamp, Some(3.0));
        assert_eq!(config.evolution.elite_count, DEFAULT_ELITE_COUNT);
    }
}
