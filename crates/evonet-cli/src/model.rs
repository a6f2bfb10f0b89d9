use std::path::Path;

use chrono::{DateTime, Utc};
use evonet_network::Network;
use evonet_training::PopulationConfig;
use serde::{Deserialize, Serialize};

use crate::{env::EnvKind, util};

/// A trained network together with the run that produced it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkModel {
    pub env: EnvKind,
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub generations: usize,
    pub best_fitness: f64,
    pub config: PopulationConfig,
    pub network: Network,
}

impl NetworkModel {
    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("model", path)
    }
}
